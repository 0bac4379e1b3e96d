//! winit → [`InputEvent`] translation.

use crate::camera::{InputEvent, Key};
use glam::DVec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixel wheel deltas per notch on most platforms.
const PIXELS_PER_NOTCH: f64 = 120.0;

/// Tracks the cursor so presses (which carry no position in winit) can be
/// reported with one.
///
/// Positions are reported in logical pixels, so orbit speed per pixel does
/// not change with the display's scale factor.
#[derive(Debug)]
pub struct InputTranslator {
    cursor: DVec2,
    scale_factor: f64,
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::with_scale_factor(1.0)
    }
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale_factor(scale_factor: f64) -> Self {
        Self {
            cursor: DVec2::ZERO,
            scale_factor,
        }
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = *scale_factor;
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(self.scale_factor);
                self.cursor = DVec2::new(logical.x, logical.y);
                Some(InputEvent::PointerMove(self.cursor))
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => Some(match state {
                ElementState::Pressed => InputEvent::PointerDown(self.cursor),
                ElementState::Released => InputEvent::PointerUp,
            }),
            // A release may happen while another window has focus.
            WindowEvent::Focused(false) => Some(InputEvent::PointerUp),
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_NOTCH) as f32,
                };
                Some(InputEvent::Wheel(notches))
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                let key = match event.physical_key {
                    PhysicalKey::Code(KeyCode::KeyW) => Key::W,
                    PhysicalKey::Code(KeyCode::KeyA) => Key::A,
                    PhysicalKey::Code(KeyCode::KeyS) => Key::S,
                    PhysicalKey::Code(KeyCode::KeyD) => Key::D,
                    _ => Key::Other,
                };
                Some(InputEvent::KeyDown(key))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, TouchPhase};

    fn device() -> DeviceId {
        // SAFETY: only compared, never handed to the platform.
        unsafe { DeviceId::dummy() }
    }

    fn moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn left(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Left,
        }
    }

    fn wheel(delta: MouseScrollDelta) -> WindowEvent {
        WindowEvent::MouseWheel {
            device_id: device(),
            delta,
            phase: TouchPhase::Moved,
        }
    }

    #[test]
    fn press_reports_last_cursor_position() {
        let mut t = InputTranslator::new();
        assert_eq!(
            t.translate(&moved(100.0, 100.0)),
            Some(InputEvent::PointerMove(DVec2::new(100.0, 100.0)))
        );
        assert_eq!(
            t.translate(&left(ElementState::Pressed)),
            Some(InputEvent::PointerDown(DVec2::new(100.0, 100.0)))
        );
        assert_eq!(t.translate(&left(ElementState::Released)), Some(InputEvent::PointerUp));
    }

    #[test]
    fn positions_are_logical_on_scaled_displays() {
        let mut t = InputTranslator::with_scale_factor(2.0);
        assert_eq!(
            t.translate(&moved(200.0, 200.0)),
            Some(InputEvent::PointerMove(DVec2::new(100.0, 100.0)))
        );
        assert_eq!(
            t.translate(&left(ElementState::Pressed)),
            Some(InputEvent::PointerDown(DVec2::new(100.0, 100.0)))
        );
        assert_eq!(
            t.translate(&moved(220.0, 190.0)),
            Some(InputEvent::PointerMove(DVec2::new(110.0, 95.0)))
        );
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut t = InputTranslator::new();
        let right = WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: MouseButton::Right,
        };
        assert_eq!(t.translate(&right), None);
    }

    #[test]
    fn focus_loss_ends_a_drag() {
        let mut t = InputTranslator::new();
        assert_eq!(t.translate(&WindowEvent::Focused(false)), Some(InputEvent::PointerUp));
        assert_eq!(t.translate(&WindowEvent::Focused(true)), None);
    }

    #[test]
    fn wheel_deltas_are_in_notches() {
        let mut t = InputTranslator::new();
        assert_eq!(
            t.translate(&wheel(MouseScrollDelta::LineDelta(0.0, -2.0))),
            Some(InputEvent::Wheel(-2.0))
        );
        assert_eq!(
            t.translate(&wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 240.0)))),
            Some(InputEvent::Wheel(2.0))
        );
    }
}
