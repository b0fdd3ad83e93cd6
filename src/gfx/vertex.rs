//! # Vertex Data Structures
//!
//! GPU-compatible vertex format for the welded meshes: position, normal, and
//! texture coordinates, laid out exactly as the shader's `VertexInput`.

/// A 3D vertex carrying position, normal, and texture coordinates.
///
/// # Memory Layout
///
/// `#[repr(C)]` with tightly packed fields (position/normal/uv) gives a
/// C-compatible, 32-byte layout that matches the GPU vertex input bit-for-bit,
/// so the buffer can be uploaded directly via `bytemuck`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
    /// Texture coordinates [u, v]
    pub uv: [f32; 2],
}

impl TexturedVertex {
    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: Position (Float32x3) at shader location 0
    /// - Attribute 1: Normal (Float32x3) at shader location 1
    /// - Attribute 2: UV (Float32x2) at shader location 2
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TexturedVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }

    /// Returns `true` when two vertices carry bit-identical attributes.
    ///
    /// Comparison is by `f32::to_bits` on the normal and uv channels, so the
    /// welder's dedup is deterministic (and re-runs are byte-identical).
    pub fn attributes_match(&self, other: &TexturedVertex) -> bool {
        let bits3 = |a: &[f32; 3]| [a[0].to_bits(), a[1].to_bits(), a[2].to_bits()];
        let bits2 = |a: &[f32; 2]| [a[0].to_bits(), a[1].to_bits()];
        bits3(&self.normal) == bits3(&other.normal) && bits2(&self.uv) == bits2(&other.uv)
    }
}
