//! Depth grid → flat point-cloud vertex stream.

use crate::error::FrameError;
use crate::frame::{DepthFrame, FrameDims};
use rayon::prelude::*;

/// Normal emitted for every vertex in [`VertexLayout::PositionNormal`].
pub const NORMAL_UP: [f32; 3] = [0.0, 0.0, 1.0];

/// Per-vertex float layout of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexLayout {
    /// `x, y, z`
    #[default]
    Position,
    /// `x, y, z, nx, ny, nz`
    PositionNormal,
}

impl VertexLayout {
    /// Floats per vertex.
    #[inline]
    pub const fn stride(self) -> usize {
        match self {
            VertexLayout::Position => 3,
            VertexLayout::PositionNormal => 6,
        }
    }
}

/// How the pixel grid is translated in the XY plane at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Centering {
    None,
    /// Moves the grid center onto the origin.
    #[default]
    GridCenter,
}

impl Centering {
    /// 2D translation to apply to `(x, y)` for a grid of `dims`.
    pub fn offset(self, dims: FrameDims) -> [f32; 2] {
        match self {
            Centering::None => [0.0, 0.0],
            Centering::GridCenter => [
                -((dims.width as f32 - 1.0) / 2.0),
                -((dims.height as f32 - 1.0) / 2.0),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamParams {
    pub depth_scale: f32,
    pub layout: VertexLayout,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            depth_scale: 1.0,
            layout: VertexLayout::Position,
        }
    }
}

/// Writes one vertex per pixel into `out`, which must be exactly
/// `pixel_count * stride` long.
fn fill_stream(out: &mut [f32], frame: &DepthFrame, params: StreamParams) {
    let width = frame.width() as usize;
    let stride = params.layout.stride();
    let scale = params.depth_scale;

    out.par_chunks_mut(width * stride)
        .zip(frame.values().par_chunks(width))
        .enumerate()
        .for_each(|(y, (row_out, row_in))| {
            let fy = y as f32;
            for (x, (vertex, &depth)) in row_out.chunks_exact_mut(stride).zip(row_in).enumerate() {
                vertex[0] = x as f32;
                vertex[1] = fy;
                vertex[2] = depth * scale;
                if stride == 6 {
                    vertex[3..6].copy_from_slice(&NORMAL_UP);
                }
            }
        });
}

/// Builds a fresh vertex stream for `frame`. Pure: the same frame and
/// parameters always produce the same bytes.
pub fn build_vertex_stream(frame: &DepthFrame, params: StreamParams) -> Vec<f32> {
    let mut out = vec![0.0; frame.dims().pixel_count() * params.layout.stride()];
    fill_stream(&mut out, frame, params);
    out
}

/// Flat vertex storage sized once for a fixed frame size and overwritten in
/// place on every rebuild.
#[derive(Debug, Clone)]
pub struct PointCloudBuffer {
    data: Vec<f32>,
    dims: FrameDims,
    layout: VertexLayout,
}

impl PointCloudBuffer {
    /// Reserves room for `dims.pixel_count() * stride` floats. The buffer starts
    /// empty; the first [`rebuild`](Self::rebuild) fills it.
    pub fn with_capacity(dims: FrameDims, layout: VertexLayout) -> Self {
        Self {
            data: Vec::with_capacity(dims.pixel_count() * layout.stride()),
            dims,
            layout,
        }
    }

    /// Replaces the contents with the stream for `frame`.
    ///
    /// Frames of any other size are rejected and leave the buffer untouched;
    /// the storage never grows past the reserved capacity.
    pub fn rebuild(&mut self, frame: &DepthFrame, depth_scale: f32) -> Result<(), FrameError> {
        frame.validate_against(self.dims)?;

        let len = self.dims.pixel_count() * self.layout.stride();
        self.data.resize(len, 0.0);
        fill_stream(
            &mut self.data,
            frame,
            StreamParams {
                depth_scale,
                layout: self.layout,
            },
        );
        Ok(())
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline]
    pub fn dims(&self) -> FrameDims {
        self.dims
    }

    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.stride()
    }

    /// Number of points currently held.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.layout.stride()
    }

    /// Size in bytes of a full frame's stream.
    #[inline]
    pub fn full_size_bytes(&self) -> u64 {
        (self.dims.pixel_count() * self.layout.stride() * std::mem::size_of::<f32>()) as u64
    }
}
