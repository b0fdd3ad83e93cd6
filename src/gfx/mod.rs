//! # Graphics Module
//!
//! Rendering side of the viewer: the welded-mesh scene objects, the orbit
//! camera, and the wgpu render engine that draws them under a single
//! directional light.

pub mod camera;
pub mod global_bindings;
pub mod object;
pub mod render_engine;
pub mod scene;
pub mod texture_resource;
pub mod vertex;

pub use object::{DrawObject, Mesh, Object};
pub use render_engine::RenderEngine;
pub use scene::Scene;
pub use vertex::TexturedVertex;
