// src/lib.rs
//! Bannock Scene Viewer
//!
//! Imports polygon-soup scene files, welds them into compact indexed
//! triangle meshes, and renders them with wgpu under an orbiting camera and
//! a single directional light.

pub mod app;
pub mod gfx;
pub mod import;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::BannockApp;
pub use import::ImportError;

/// Creates a default application instance
pub fn default() -> BannockApp {
    pollster::block_on(BannockApp::new())
}
