use crate::frame::{FrameDims, PixelFormat};
use thiserror::Error;

/// Reasons a frame is refused before any GPU work happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame is empty")]
    Empty,

    #[error("frame is {actual}, expected {expected}")]
    DimensionMismatch { expected: FrameDims, actual: FrameDims },

    #[error("payload holds {actual} elements, {dims} needs {expected}")]
    LengthMismatch {
        dims: FrameDims,
        expected: usize,
        actual: usize,
    },

    #[error("unexpected pixel format {actual}, expected {expected}")]
    UnexpectedFormat {
        expected: &'static str,
        actual: PixelFormat,
    },

    #[error("color frame is {color}, depth frame is {depth}")]
    SizeMismatch { depth: FrameDims, color: FrameDims },
}
