//! # Scene Import Pipeline
//!
//! Everything between a scene file on disk and GPU-ready buffers:
//!
//! - [`document`] - the in-memory scene model (node tree, polygon-soup
//!   geometry, attribute layers)
//! - [`obj`] - the Wavefront OBJ loader producing that model
//! - [`attributes`] - per-corner normal/UV resolution across mapping and
//!   reference modes
//! - [`welder`] - vertex deduplication and triangle index construction
//!
//! The pipeline is synchronous and single-threaded: a document is loaded and
//! welded to completion before anything is uploaded or drawn.

pub mod attributes;
pub mod document;
pub mod error;
pub mod obj;
pub mod welder;

pub use document::{AttributeLayer, MappingMode, MeshGeometry, ReferenceMode, SceneDocument, SceneNode};
pub use error::ImportError;
pub use welder::{weld_document, weld_mesh, MeshBuffers};
