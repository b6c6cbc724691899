use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::orbit_camera::OrbitCamera;

/// Mouse controls for an [`OrbitCamera`]
///
/// Left drag orbits, shift + left drag pans, the wheel zooms.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            is_shift_held: false,
            is_mouse_pressed: false,
            last_cursor: None,
        }
    }

    /// Applies a window event to `camera`. Returns true when the view changed.
    pub fn process_window_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.is_shift_held = modifiers.state().shift_key();
                false
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
                false
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                self.is_mouse_pressed = false;
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let previous = self.last_cursor.replace(*position);
                let Some(previous) = previous else {
                    return false;
                };
                if !self.is_mouse_pressed {
                    return false;
                }
                let dx = (position.x - previous.x) as f32;
                let dy = (position.y - previous.y) as f32;
                self.drag(camera, dx, dy);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => *lines,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 20.0,
                };
                camera.add_distance(-scroll * self.zoom_speed);
                true
            }
            _ => false,
        }
    }

    fn drag(&self, camera: &mut OrbitCamera, dx: f32, dy: f32) {
        if self.is_shift_held {
            camera.pan((-dx * self.pan_speed, dy * self.pan_speed));
        } else {
            camera.add_yaw(-dx * self.rotate_speed);
            camera.add_pitch(dy * self.rotate_speed);
        }
    }
}
