// src/lib.rs
//! Live point-cloud viewer for streaming depth maps.
//!
//! Each depth pixel becomes one GPU vertex, colored from an aligned color
//! frame. The camera orbits with the mouse, zooms with the wheel and pans with
//! W/A/S/D; transform uniforms are only rebuilt when the camera changed.

pub mod app;
pub mod camera;
pub mod config;
pub mod data;
pub mod error;
pub mod gpu;
pub mod input;
pub mod render;
pub mod renderer;
pub mod source;
pub mod ui;

pub use self::error::RenderError;
pub use self::gpu::{ContextScope, GpuBackend, StorageSpec};
