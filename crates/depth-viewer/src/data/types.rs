//! GPU-facing data layouts.

/// Per-draw transform block, std140.
/// Must match `Transforms` in `depth_points.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniforms {
    pub proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    /// Added to each vertex's `(x, y)` before the world transform.
    pub translation: [f32; 2],
    /// Depth grid size in pixels; the vertex stage divides by it for UVs.
    pub frame_size: [f32; 2],
}

impl TransformUniforms {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}
