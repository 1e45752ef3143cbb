pub mod context;
pub mod device;
pub mod mesh;
pub mod model;
pub mod program;

#[cfg(test)]
pub mod recording_device;

/// Floats per interleaved vertex: position (3), normal (3), texture coordinate (2).
pub const FLOATS_PER_VERTEX: usize = 8;

/// Byte distance between consecutive vertices in the vertex buffer.
pub const VERTEX_STRIDE: wgpu::BufferAddress =
    (FLOATS_PER_VERTEX * size_of::<f32>()) as wgpu::BufferAddress;

/// Fixed attribute locations: 0 = position, 1 = normal, 2 = texture coordinate.
/// Byte offsets are 0, 12 and 24.
pub const VERTEX_FORMAT: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x2,
];

pub type MeshIndex = u32;

pub type Size2D = [u32; 2];
