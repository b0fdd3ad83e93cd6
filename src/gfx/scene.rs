use std::path::Path;

use super::camera::camera_utils::CameraManager;
use super::object::{Mesh, Object};
use crate::import::{weld_document, ImportError, SceneDocument};

/// Main scene containing objects and the camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
}

impl Scene {
    /// Creates a new scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
        }
    }

    /// Updates the scene (camera matrices, etc.)
    pub fn update(&mut self) {
        self.camera_manager.camera.update_view_proj();
    }

    /// Loads a scene file and adds it as one object.
    ///
    /// The whole document hierarchy is welded into a single vertex/index
    /// buffer pair, so the object draws with one indexed call regardless of
    /// how many mesh nodes the file contains. Fails without touching the
    /// scene if the file cannot be loaded.
    pub fn add_object(&mut self, path: impl AsRef<Path>) -> Result<(), ImportError> {
        let path = path.as_ref();
        let document = SceneDocument::load(path)?;
        let buffers = weld_document(&document);

        let name = self.ensure_unique_name(&document.root.name);
        self.objects.push(Object::new(name, Mesh::new(buffers)));
        Ok(())
    }

    /// Initializes GPU resources for all objects
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device) {
        for object in self.objects.iter_mut() {
            object.init_gpu_resources(device);
        }
    }

    /// Updates all object transforms and syncs to GPU
    pub fn update_all_transforms(&mut self, queue: &wgpu::Queue) {
        for object in &mut self.objects {
            if object.gpu_resources.is_some() {
                object.update_transform(queue);
            }
        }
    }

    pub fn get_object(&self, index: usize) -> Option<&Object> {
        self.objects.get(index)
    }

    pub fn get_object_mut(&mut self, index: usize) -> Option<&mut Object> {
        self.objects.get_mut(index)
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let total_triangles: u32 = self
            .objects
            .iter()
            .map(|obj| obj.mesh.index_count() / 3)
            .sum();
        let total_vertices: u32 = self.objects.iter().map(|obj| obj.mesh.vertex_count()).sum();

        SceneStatistics {
            object_count: self.objects.len(),
            total_triangles,
            total_vertices,
        }
    }

    fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.objects.iter().any(|obj| obj.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }
}

/// Scene statistics for debugging and diagnostics
#[derive(Debug)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}
