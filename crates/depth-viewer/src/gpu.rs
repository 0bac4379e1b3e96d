//! The boundary between the rendering core and whatever owns the GPU.
//!
//! The core never creates devices, surfaces or windows. It talks to a
//! [`GpuBackend`] through a [`ContextScope`], which brackets every group of
//! GPU calls with `acquire`/`release` and releases on every exit path.

use crate::data::types::TransformUniforms;
use crate::error::RenderError;
use depthframe::FrameDims;
use std::ops::{Deref, DerefMut};

/// Sizes of the long-lived storage behind one point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageSpec {
    /// Texture size; also the point grid size.
    pub frame: FrameDims,
    /// Vertex buffer size in bytes.
    pub vertex_bytes: u64,
}

pub trait GpuBackend {
    /// What a draw renders into (a swapchain view for wgpu).
    type Target: ?Sized;

    /// Makes the context usable for the calls that follow. Fails with
    /// [`RenderError::ContextUnavailable`] when there is nothing to draw with.
    fn acquire(&mut self) -> Result<(), RenderError>;

    /// Ends the scope opened by [`acquire`](Self::acquire).
    fn release(&mut self);

    /// Creates vertex and texture storage. Called once per renderer.
    fn allocate_storage(&mut self, spec: StorageSpec) -> Result<(), RenderError>;

    /// Overwrites vertex storage starting at `offset` bytes.
    fn write_vertices(&mut self, offset: u64, vertices: &[f32]);

    /// Overwrites the whole texture with tightly packed RGBA8 pixels.
    fn write_color(&mut self, rgba: &[u8]);

    fn write_uniforms(&mut self, uniforms: &TransformUniforms);

    /// Draws `vertex_count` unconnected points with the bound texture.
    fn draw_points(&mut self, target: &Self::Target, vertex_count: u32);

    fn request_redraw(&self);
}

/// RAII guard over an acquired backend.
pub struct ContextScope<'a, B: GpuBackend> {
    backend: &'a mut B,
}

impl<'a, B: GpuBackend> ContextScope<'a, B> {
    pub fn acquire(backend: &'a mut B) -> Result<Self, RenderError> {
        backend.acquire()?;
        Ok(Self { backend })
    }
}

impl<B: GpuBackend> Deref for ContextScope<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: GpuBackend> DerefMut for ContextScope<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: GpuBackend> Drop for ContextScope<'_, B> {
    fn drop(&mut self) {
        self.backend.release();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A backend that records calls instead of touching a GPU.

    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Allocate(StorageSpec),
        Vertices { offset: u64, len: usize },
        Color(usize),
        Uniforms,
        Draw(u32),
    }

    #[derive(Default)]
    pub struct RecordingBackend {
        pub calls: Vec<Call>,
        pub vertices: Vec<f32>,
        pub color: Vec<u8>,
        pub uniforms: Option<TransformUniforms>,
        pub depth: usize,
        pub max_depth: usize,
        pub unavailable: bool,
        pub redraws: Cell<usize>,
    }

    impl RecordingBackend {
        pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.iter().filter(|c| pred(c)).count()
        }
    }

    impl GpuBackend for RecordingBackend {
        type Target = ();

        fn acquire(&mut self) -> Result<(), RenderError> {
            if self.unavailable {
                return Err(RenderError::ContextUnavailable("test backend offline".into()));
            }
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            Ok(())
        }

        fn release(&mut self) {
            self.depth -= 1;
        }

        fn allocate_storage(&mut self, spec: StorageSpec) -> Result<(), RenderError> {
            self.calls.push(Call::Allocate(spec));
            self.vertices = vec![0.0; spec.vertex_bytes as usize / 4];
            self.color = vec![0; spec.frame.pixel_count() * 4];
            Ok(())
        }

        fn write_vertices(&mut self, offset: u64, vertices: &[f32]) {
            self.calls.push(Call::Vertices {
                offset,
                len: vertices.len(),
            });
            let start = offset as usize / 4;
            self.vertices[start..start + vertices.len()].copy_from_slice(vertices);
        }

        fn write_color(&mut self, rgba: &[u8]) {
            self.calls.push(Call::Color(rgba.len()));
            self.color.copy_from_slice(rgba);
        }

        fn write_uniforms(&mut self, uniforms: &TransformUniforms) {
            self.calls.push(Call::Uniforms);
            self.uniforms = Some(*uniforms);
        }

        fn draw_points(&mut self, _target: &(), vertex_count: u32) {
            self.calls.push(Call::Draw(vertex_count));
        }

        fn request_redraw(&self) {
            self.redraws.set(self.redraws.get() + 1);
        }
    }

    #[test]
    fn scope_releases_on_drop() {
        let mut backend = RecordingBackend::default();
        {
            let mut scope = ContextScope::acquire(&mut backend).unwrap();
            scope.draw_points(&(), 3);
            assert_eq!(scope.depth, 1);
        }
        assert_eq!(backend.depth, 0);
        assert_eq!(backend.calls, vec![Call::Draw(3)]);
    }

    #[test]
    fn failed_acquire_leaves_nothing_open() {
        let mut backend = RecordingBackend {
            unavailable: true,
            ..Default::default()
        };
        assert!(matches!(
            ContextScope::acquire(&mut backend),
            Err(RenderError::ContextUnavailable(_))
        ));
        assert_eq!(backend.depth, 0);
    }
}
