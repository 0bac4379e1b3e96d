//! Lazy uniform recomputation and the per-paint draw.

use crate::camera::CameraState;
use crate::data::types::TransformUniforms;
use crate::error::RenderError;
use crate::gpu::{ContextScope, GpuBackend};
use depthframe::{Centering, FrameDims};
use glam::Mat4;

pub const FOV_Y_DEG: f32 = 45.0;
pub const Z_NEAR: f32 = 0.01;
/// Far enough for large depth-scale multipliers.
pub const Z_FAR: f32 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintReport {
    /// Whether this paint recomputed and uploaded the uniforms.
    pub recomputed: bool,
    pub vertices: u32,
}

/// Caches the last uniform block and only rebuilds it when the camera's dirty
/// flag is raised.
pub struct RenderLoop {
    viewport: Viewport,
    translation: [f32; 2],
    frame_size: [f32; 2],
    current: TransformUniforms,
    recomputes: u64,
}

impl RenderLoop {
    pub fn new(viewport: Viewport, dims: FrameDims, centering: Centering) -> Self {
        Self {
            viewport,
            translation: centering.offset(dims),
            frame_size: [dims.width as f32, dims.height as f32],
            current: bytemuck::Zeroable::zeroed(),
            recomputes: 0,
        }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Last uploaded uniform block.
    #[inline]
    pub fn uniforms(&self) -> &TransformUniforms {
        &self.current
    }

    #[inline]
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    /// Records a new viewport size. Zero-sized viewports (minimized windows)
    /// are ignored.
    pub fn resize(&mut self, camera: &mut CameraState, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.viewport = Viewport { width, height };
        camera.mark_dirty();
        true
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEG.to_radians(), self.viewport.aspect(), Z_NEAR, Z_FAR)
    }

    fn compute(&self, camera: &CameraState) -> TransformUniforms {
        TransformUniforms {
            proj: self.projection().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            world: camera.world_matrix().to_cols_array_2d(),
            translation: self.translation,
            frame_size: self.frame_size,
        }
    }

    /// Recomputes and uploads the uniforms if the camera is dirty, then draws
    /// `vertex_count` points into `target`.
    pub fn paint<B: GpuBackend>(
        &mut self,
        camera: &mut CameraState,
        backend: &mut B,
        target: &B::Target,
        vertex_count: u32,
    ) -> Result<PaintReport, RenderError> {
        let mut scope = ContextScope::acquire(backend)?;

        let recomputed = camera.take_dirty();
        if recomputed {
            self.current = self.compute(camera);
            self.recomputes += 1;
            scope.write_uniforms(&self.current);
            log::trace!(
                "uniforms recomputed: eye={:?} yaw={} pitch={} aspect={:.3}",
                camera.eye,
                camera.yaw_deg,
                camera.pitch_deg,
                self.viewport.aspect()
            );
        }

        scope.draw_points(target, vertex_count);

        Ok(PaintReport {
            recomputed,
            vertices: vertex_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraController, InputEvent};
    use crate::gpu::testing::{Call, RecordingBackend};
    use glam::DVec2;

    fn setup() -> (RenderLoop, CameraController, RecordingBackend) {
        let dims = FrameDims::new(784, 448);
        let lp = RenderLoop::new(
            Viewport {
                width: 800,
                height: 600,
            },
            dims,
            Centering::GridCenter,
        );
        (lp, CameraController::new(CameraState::new(500.0)), RecordingBackend::default())
    }

    #[test]
    fn clean_paint_uploads_nothing() {
        let (mut lp, mut cam, mut gpu) = setup();

        let first = lp.paint(cam.state_mut(), &mut gpu, &(), 10).unwrap();
        assert!(first.recomputed);
        assert!(!cam.state().is_dirty());
        let after_first = *lp.uniforms();

        let second = lp.paint(cam.state_mut(), &mut gpu, &(), 10).unwrap();
        assert!(!second.recomputed);
        assert_eq!(*lp.uniforms(), after_first);
        assert_eq!(gpu.count(|c| *c == Call::Uniforms), 1);
        assert_eq!(gpu.count(|c| matches!(c, Call::Draw(10))), 2);
        assert_eq!(lp.recomputes(), 1);
    }

    #[test]
    fn camera_events_trigger_one_recompute() {
        let (mut lp, mut cam, mut gpu) = setup();
        lp.paint(cam.state_mut(), &mut gpu, &(), 1).unwrap();

        cam.handle(InputEvent::PointerDown(DVec2::new(100.0, 100.0)));
        cam.handle(InputEvent::PointerMove(DVec2::new(110.0, 95.0)));
        assert!(cam.state().is_dirty());

        let report = lp.paint(cam.state_mut(), &mut gpu, &(), 1).unwrap();
        assert!(report.recomputed);
        let expected = cam.state().world_matrix().to_cols_array_2d();
        assert_eq!(lp.uniforms().world, expected);
        assert_eq!(gpu.uniforms, Some(*lp.uniforms()));
    }

    #[test]
    fn resize_recomputes_projection_only_from_new_aspect() {
        let (mut lp, mut cam, mut gpu) = setup();
        lp.paint(cam.state_mut(), &mut gpu, &(), 1).unwrap();
        let eye = cam.state().eye;
        let target = cam.state().target;

        assert!(lp.resize(cam.state_mut(), 1024, 768));
        assert!(cam.state().is_dirty());
        lp.paint(cam.state_mut(), &mut gpu, &(), 1).unwrap();

        let expected = Mat4::perspective_rh(45f32.to_radians(), 1024.0 / 768.0, 0.01, 5000.0);
        assert_eq!(lp.uniforms().proj, expected.to_cols_array_2d());
        assert_eq!(cam.state().eye, eye);
        assert_eq!(cam.state().target, target);
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let (mut lp, mut cam, _) = setup();
        cam.state_mut().take_dirty();
        assert!(!lp.resize(cam.state_mut(), 0, 600));
        assert!(!cam.state().is_dirty());
        assert_eq!(lp.viewport().width, 800);
    }

    #[test]
    fn unavailable_context_keeps_the_flag() {
        let (mut lp, mut cam, mut gpu) = setup();
        gpu.unavailable = true;
        assert!(matches!(
            lp.paint(cam.state_mut(), &mut gpu, &(), 1),
            Err(RenderError::ContextUnavailable(_))
        ));
        assert!(cam.state().is_dirty());
        assert!(gpu.calls.is_empty());
    }

    #[test]
    fn uniforms_carry_centering_and_frame_size() {
        let (mut lp, mut cam, mut gpu) = setup();
        lp.paint(cam.state_mut(), &mut gpu, &(), 1).unwrap();
        assert_eq!(lp.uniforms().translation, [-391.5, -223.5]);
        assert_eq!(lp.uniforms().frame_size, [784.0, 448.0]);
    }
}
