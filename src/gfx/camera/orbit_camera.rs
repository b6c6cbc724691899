use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

use crate::geometry::Bounds;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Pitch and yaw the camera starts from when framing a scene
const DEFAULT_PITCH: f32 = 0.35;
const DEFAULT_YAW: f32 = 0.6;

/// Camera orbiting `target` on a sphere of radius `distance`, Z up.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // recomputed by `update()`
            target,
            up: Vector3::unit_z(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 6.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera.update_view_proj();
        camera
    }

    /// Points the camera at the center of `bounds` from far enough away that
    /// the whole bounding sphere is in view. Clip planes and zoom limits are
    /// scaled to the scene.
    pub fn frame_bounds(&mut self, bounds: &Bounds) {
        let radius = match bounds.radius() {
            r if r > f32::EPSILON && r.is_finite() => r,
            _ => 1.0,
        };
        let half_fov = (self.fovy.0 / 2.0).min(self.fovy.0 * self.aspect.min(1.0) / 2.0);

        self.target = bounds.center();
        self.pitch = DEFAULT_PITCH;
        self.yaw = DEFAULT_YAW;
        self.distance = radius / half_fov.sin();
        self.bounds.min_distance = Some(radius * 0.05);
        self.bounds.max_distance = Some(self.distance * 10.0);
        self.znear = radius * 0.01;
        self.zfar = self.distance + radius * 20.0;

        self.update();
        self.update_view_proj();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    /// Zooms by a fraction of the current distance.
    pub fn add_distance(&mut self, delta: f32) {
        self.set_distance(self.distance * (1.0 + delta));
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the camera relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        let pan_scale = self.distance * 0.1;
        let movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;

        self.eye += movement;
        self.target += movement;
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: None,
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * pitch.cos() * yaw.sin(),
        -distance * pitch.cos() * yaw.cos(),
        distance * pitch.sin(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_bounds() -> Bounds {
        Bounds::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(10.0, 20.0, 30.0))
    }

    #[test]
    fn test_frame_bounds_targets_center() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 4.0 / 3.0);
        camera.frame_bounds(&cube_bounds());
        assert_eq!(camera.target, Vector3::new(5.0, 10.0, 15.0));
        let eye_distance = (camera.eye - camera.target).magnitude();
        assert!((eye_distance - camera.distance).abs() < 1e-3);
        assert!(camera.distance > cube_bounds().radius());
        assert!(camera.znear > 0.0 && camera.zfar > camera.distance + cube_bounds().radius());
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.frame_bounds(&cube_bounds());
        let clip = camera.build_view_projection_matrix() * camera.target.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-4);
        assert!((clip.y / clip.w).abs() < 1e-4);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn test_pitch_is_clamped_below_the_pole() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.add_pitch(10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        camera.add_pitch(-20.0);
        assert!(camera.pitch > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.frame_bounds(&cube_bounds());
        let max = camera.bounds.max_distance.unwrap();
        for _ in 0..100 {
            camera.add_distance(0.5);
        }
        assert_eq!(camera.distance, max);
    }

    #[test]
    fn test_pan_moves_eye_and_target_together() {
        let mut camera = OrbitCamera::new(5.0, 0.2, 0.3, Vector3::zero(), 1.0);
        let offset = camera.eye - camera.target;
        camera.pan((1.0, -0.5));
        assert!(((camera.eye - camera.target) - offset).magnitude() < 1e-5);
        assert!(camera.target.magnitude() > 0.0);
    }
}
