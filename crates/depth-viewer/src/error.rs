use depthframe::FrameError;
use thiserror::Error;

/// Failures surfaced by the rendering core.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The frame was dropped; the last good frame stays on screen.
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),

    #[error("GPU context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("render pipeline link failed: {0}")]
    Link(String),
}

impl RenderError {
    /// Everything except a rejected frame aborts the operation that hit it.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RenderError::InvalidFrame(_))
    }
}
