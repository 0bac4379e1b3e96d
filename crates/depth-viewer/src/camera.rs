use glam::{DVec2, Mat4, Vec3};

/// Degrees of yaw/pitch per pixel of pointer travel.
pub const SENSITIVITY: f32 = 0.5;
/// Eye travel along Z per wheel notch.
pub const ZOOM_STEP: f32 = 10.0;
/// Eye travel along X/Y per key press.
pub const PAN_STEP: f32 = 5.0;
/// Look direction, relative to the eye.
pub const DEFAULT_TARGET: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Transform applied to the grid before yaw/pitch: pushed back one unit and
/// flipped about X so image rows grow downward on screen.
pub fn default_base_world() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0)) * Mat4::from_rotation_x(180f32.to_radians())
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    W,
    A,
    S,
    D,
    Other,
}

/// Discrete input, already stripped of any windowing-toolkit types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown(DVec2),
    PointerMove(DVec2),
    PointerUp,
    /// Wheel travel in notches; positive zooms in.
    Wheel(f32),
    KeyDown(Key),
}

#[derive(Debug, Clone)]
pub struct CameraState {
    pub eye: Vec3,
    pub target: Vec3,
    /// Degrees about +Y. Accumulates without wrapping.
    pub yaw_deg: f32,
    /// Degrees about +X. Accumulates without clamping.
    pub pitch_deg: f32,
    pub base_world: Mat4,
    uniforms_dirty: bool,
}

impl CameraState {
    pub fn new(eye_distance: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, eye_distance),
            target: DEFAULT_TARGET,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            base_world: default_base_world(),
            uniforms_dirty: true,
        }
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.uniforms_dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.uniforms_dirty
    }

    /// Returns the flag and clears it.
    #[inline]
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.uniforms_dirty, false)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.eye + self.target, Vec3::Y)
    }

    /// Base transform, then yaw about Y, then pitch about X.
    pub fn world_matrix(&self) -> Mat4 {
        self.base_world
            * Mat4::from_rotation_y(self.yaw_deg.to_radians())
            * Mat4::from_rotation_x(self.pitch_deg.to_radians())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Idle,
    Dragging { last: DVec2 },
}

/// Owns the camera and turns input into camera changes.
///
/// Every method returns `true` when the camera changed; the caller is expected
/// to request a redraw in that case.
pub struct CameraController {
    state: CameraState,
    drag: Drag,
}

impl CameraController {
    pub fn new(state: CameraState) -> Self {
        Self {
            state,
            drag: Drag::Idle,
        }
    }

    #[inline]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut CameraState {
        &mut self.state
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, Drag::Dragging { .. })
    }

    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PointerDown(pos) => {
                self.drag = Drag::Dragging { last: pos };
                false
            }
            InputEvent::PointerMove(pos) => self.handle_drag(pos),
            InputEvent::PointerUp => {
                self.drag = Drag::Idle;
                false
            }
            InputEvent::Wheel(notches) => self.handle_wheel(notches),
            InputEvent::KeyDown(key) => self.handle_key(key),
        }
    }

    fn handle_drag(&mut self, pos: DVec2) -> bool {
        let Drag::Dragging { last } = self.drag else {
            return false;
        };

        let delta = pos - last;
        self.state.yaw_deg += delta.x as f32 * SENSITIVITY;
        self.state.pitch_deg += delta.y as f32 * SENSITIVITY;
        self.drag = Drag::Dragging { last: pos };
        self.state.mark_dirty();
        true
    }

    fn handle_wheel(&mut self, notches: f32) -> bool {
        // Positive = scroll up = move the eye toward the grid.
        self.state.eye.z -= notches * ZOOM_STEP;
        self.state.mark_dirty();
        true
    }

    fn handle_key(&mut self, key: Key) -> bool {
        let eye = &mut self.state.eye;
        match key {
            Key::W => eye.y -= PAN_STEP,
            Key::S => eye.y += PAN_STEP,
            Key::A => eye.x += PAN_STEP,
            Key::D => eye.x -= PAN_STEP,
            Key::Other => return false,
        }
        self.state.mark_dirty();
        true
    }

    pub fn set_eye(&mut self, eye: Vec3) -> bool {
        self.state.eye = eye;
        self.state.mark_dirty();
        true
    }

    pub fn set_eye_z(&mut self, z: f32) -> bool {
        self.state.eye.z = z;
        self.state.mark_dirty();
        true
    }

    pub fn set_yaw_pitch(&mut self, yaw_deg: f32, pitch_deg: f32) -> bool {
        self.state.yaw_deg = yaw_deg;
        self.state.pitch_deg = pitch_deg;
        self.state.mark_dirty();
        true
    }

    pub fn set_base_world(&mut self, base_world: Mat4) -> bool {
        self.state.base_world = base_world;
        self.state.mark_dirty();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CameraController {
        let mut c = CameraController::new(CameraState::new(500.0));
        c.state_mut().take_dirty();
        c
    }

    #[test]
    fn drag_rotates_by_half_a_degree_per_pixel() {
        let mut c = controller();
        assert!(!c.handle(InputEvent::PointerDown(DVec2::new(100.0, 100.0))));
        assert!(c.handle(InputEvent::PointerMove(DVec2::new(110.0, 95.0))));

        assert_eq!(c.state().yaw_deg, 5.0);
        assert_eq!(c.state().pitch_deg, -2.5);
        assert!(c.state().is_dirty());
    }

    #[test]
    fn moves_without_a_press_are_ignored() {
        let mut c = controller();
        assert!(!c.handle(InputEvent::PointerMove(DVec2::new(50.0, 50.0))));
        assert_eq!(c.state().yaw_deg, 0.0);
        assert!(!c.state().is_dirty());
    }

    #[test]
    fn release_ends_the_drag() {
        let mut c = controller();
        c.handle(InputEvent::PointerDown(DVec2::ZERO));
        assert!(c.is_dragging());
        c.handle(InputEvent::PointerUp);
        assert!(!c.is_dragging());
        assert!(!c.handle(InputEvent::PointerMove(DVec2::new(30.0, 0.0))));
        assert_eq!(c.state().yaw_deg, 0.0);
    }

    #[test]
    fn rotation_is_additive_regardless_of_batching() {
        let path = [(3.0, -1.0), (7.0, 4.0), (-2.0, 2.0), (11.0, -9.0)];

        let mut fine = controller();
        fine.handle(InputEvent::PointerDown(DVec2::ZERO));
        let mut pos = DVec2::ZERO;
        for (dx, dy) in path {
            pos += DVec2::new(dx, dy);
            fine.handle(InputEvent::PointerMove(pos));
        }

        let mut coarse = controller();
        coarse.handle(InputEvent::PointerDown(DVec2::ZERO));
        coarse.handle(InputEvent::PointerMove(pos));

        let (sum_dx, sum_dy) = path.iter().fold((0.0, 0.0), |(x, y), (dx, dy)| (x + dx, y + dy));
        assert_eq!(fine.state().yaw_deg, 0.5 * sum_dx as f32);
        assert_eq!(fine.state().pitch_deg, 0.5 * sum_dy as f32);
        assert_eq!(fine.state().yaw_deg, coarse.state().yaw_deg);
        assert_eq!(fine.state().pitch_deg, coarse.state().pitch_deg);
    }

    #[test]
    fn rotation_is_not_wrapped() {
        let mut c = controller();
        c.handle(InputEvent::PointerDown(DVec2::ZERO));
        c.handle(InputEvent::PointerMove(DVec2::new(1000.0, 0.0)));
        assert_eq!(c.state().yaw_deg, 500.0);
    }

    #[test]
    fn wheel_moves_eye_along_z() {
        let mut c = controller();
        assert!(c.handle(InputEvent::Wheel(1.0)));
        assert_eq!(c.state().eye.z, 500.0 - ZOOM_STEP);
        c.handle(InputEvent::Wheel(-1.0));
        c.handle(InputEvent::Wheel(-1.0));
        assert_eq!(c.state().eye.z, 500.0 + ZOOM_STEP);
    }

    #[test]
    fn keys_pan_eye() {
        let mut c = controller();
        c.handle(InputEvent::KeyDown(Key::W));
        assert_eq!(c.state().eye.y, -PAN_STEP);
        c.handle(InputEvent::KeyDown(Key::S));
        c.handle(InputEvent::KeyDown(Key::S));
        assert_eq!(c.state().eye.y, PAN_STEP);
        c.handle(InputEvent::KeyDown(Key::A));
        assert_eq!(c.state().eye.x, PAN_STEP);
        c.handle(InputEvent::KeyDown(Key::D));
        c.handle(InputEvent::KeyDown(Key::D));
        assert_eq!(c.state().eye.x, -PAN_STEP);
    }

    #[test]
    fn unknown_keys_leave_the_camera_clean() {
        let mut c = controller();
        assert!(!c.handle(InputEvent::KeyDown(Key::Other)));
        assert!(!c.state().is_dirty());
    }

    #[test]
    fn setters_mark_dirty() {
        let mut c = controller();
        assert!(c.set_eye_z(42.0));
        assert!(c.state_mut().take_dirty());
        assert!(c.set_yaw_pitch(10.0, 20.0));
        assert!(c.state_mut().take_dirty());
        assert_eq!(c.state().eye.z, 42.0);

        assert!(c.set_eye(Vec3::new(1.0, 2.0, 3.0)));
        assert!(c.state_mut().take_dirty());
        assert_eq!(c.state().eye, Vec3::new(1.0, 2.0, 3.0));

        assert!(c.set_base_world(Mat4::IDENTITY));
        assert!(c.state().is_dirty());
        let expected = Mat4::from_rotation_y(10f32.to_radians()) * Mat4::from_rotation_x(20f32.to_radians());
        assert!(c.state().world_matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn base_world_flips_rows() {
        let p = default_base_world().transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(0.0, -1.0, -1.0), 1e-5));
    }

    #[test]
    fn new_camera_starts_dirty() {
        let state = CameraState::new(500.0);
        assert!(state.is_dirty());
        assert_eq!(state.eye, Vec3::new(0.0, 0.0, 500.0));
        assert_eq!(state.target, DEFAULT_TARGET);
    }
}
