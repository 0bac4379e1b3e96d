//! depthframe: per-frame data model for live depth point clouds.
//!
//! - `DepthFrame`: single-channel `f32` depth grid, row-major.
//! - `ColorFrame`: 3-channel `u8` image aligned to a depth frame, `Bgr` or `Rgb`.
//! - `RawFrame`: untyped frame (format tag + little-endian payload) as delivered
//!   by a capture device or loader; typed frames are obtained by validation.
//! - `PointCloudBuffer`: pre-reserved flat vertex stream, one point per pixel.
//!
//! Vertex stream layout (`f32`, row-major, one vertex per pixel):
//!   Position        : x, y, depth * scale                    (stride 3)
//!   PositionNormal  : x, y, depth * scale, 0.0, 0.0, 1.0     (stride 6)
//!
//! `x` is the column index and `y` the row index. The grid is left in pixel
//! units; centering around the origin is a separate 2D translation
//! (see [`Centering`]) so texture lookup can stay `(x / width, y / height)`.
//!
//! Color frames are expanded to tightly packed RGBA8 (alpha = 255) for upload.

pub mod color;
pub mod error;
pub mod frame;
pub mod vertex;

pub use color::{convert_to_rgba, to_rgba, RGBA_BYTES_PER_PIXEL};
pub use error::FrameError;
pub use frame::{validate_pair, ChannelOrder, ColorFrame, DepthFrame, FrameDims, PixelFormat, RawFrame};
pub use vertex::{build_vertex_stream, Centering, PointCloudBuffer, StreamParams, VertexLayout, NORMAL_UP};
