// src/data/mod.rs
//! Frame data on its way to the GPU.
//!
//! This module provides:
//! - The POD uniform block shared with `depth_points.wgsl`.
//! - The ingest pipeline that turns depth/color pairs into buffer updates.

pub mod ingest;
pub mod types;

pub use self::ingest::{FrameIngestPipeline, IngestStats};
pub use self::types::TransformUniforms;
