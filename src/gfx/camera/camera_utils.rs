use cgmath::{Matrix4, SquareMatrix};
use winit::event::WindowEvent;

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};

pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    /// Forwards a scene-window event to the controller; true if the view moved.
    pub fn process_event(&mut self, event: &WindowEvent) -> bool {
        let moved = self
            .controller
            .process_window_event(event, &mut self.camera);
        if moved {
            self.camera.update_view_proj();
        }
        moved
    }
}

impl Default for CameraManager {
    fn default() -> Self {
        Self::new(
            OrbitCamera::new(5.0, 0.35, 0.6, cgmath::Vector3::new(0.0, 0.0, 0.0), 1.0),
            CameraController::new(0.005, 0.1),
        )
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}
