use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;

pub const FOV_Y_DEGREES: f32 = 75.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn perspective(eye: Vec3, aspect: f32) -> Self {
        Self {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: FOV_Y_DEGREES.to_radians(),
            aspect,
            near: NEAR,
            far: FAR,
        }
    }

    pub fn set_aspect(&mut self, resolution: Vec2) {
        if resolution.x > 0.0 && resolution.y > 0.0 {
            self.aspect = resolution.x / resolution.y;
        }
    }

    pub fn get_vp_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        projection * view
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct CameraUniform {
    view_proj: Mat4,
}

impl CameraUniform {
    pub fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.get_vp_matrix();
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}

// Keeps the camera off the poles, where the view matrix degenerates.
const POLAR_EPSILON: f32 = 1.0e-4;

/// Orbits the camera around its target on a sphere.
///
/// Drag and wheel input accumulate into spherical deltas; `update` applies a
/// `damping_factor` fraction of them every frame and decays the rest, so the
/// camera keeps gliding for a while after the pointer is released.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    dragging: bool,
    last_cursor: Option<Vec2>,
}

impl OrbitControls {
    pub fn new(damping_factor: f32) -> Self {
        Self {
            damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.5,
            max_distance: 8.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn pointer_down(&mut self) {
        self.dragging = true;
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Feeds a cursor position in physical pixels. Rotates only while dragging.
    pub fn pointer_moved(&mut self, position: Vec2, viewport_height: f32) {
        if let Some(last) = self.last_cursor {
            if self.dragging && viewport_height > 0.0 {
                let delta = position - last;
                self.delta_theta -= 2.0 * PI * delta.x / viewport_height * self.rotate_speed;
                self.delta_phi -= 2.0 * PI * delta.y / viewport_height * self.rotate_speed;
            }
        }

        self.last_cursor = Some(position);
    }

    /// Positive `delta_y` (scrolling up) moves the camera closer.
    pub fn wheel(&mut self, delta_y: f32) {
        let zoom_scale = 0.95f32.powf(self.zoom_speed);

        if delta_y > 0.0 {
            self.scale *= zoom_scale;
        } else if delta_y < 0.0 {
            self.scale /= zoom_scale;
        }
    }

    /// Applies pending input to `camera`. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.eye - camera.target;
        let radius = offset.length();
        if radius == 0.0 {
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.delta_theta * self.damping_factor;
        phi += self.delta_phi * self.damping_factor;
        phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let new_offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );

        let new_eye = camera.target + new_offset;
        let moved = new_eye.distance_squared(camera.eye) > 1.0e-12;
        camera.eye = new_eye;

        self.delta_theta *= 1.0 - self.damping_factor;
        self.delta_phi *= 1.0 - self.damping_factor;
        self.scale = 1.0;

        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::perspective(Vec3::new(0.0, 0.0, 2.0), 1.0)
    }

    #[test]
    fn idle_controls_leave_camera_in_place() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(0.03);

        assert!(!controls.update(&mut camera));
        assert!((camera.eye - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn drag_rotates_and_damping_decays() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(0.03);

        controls.pointer_moved(Vec2::new(100.0, 100.0), 800.0);
        controls.pointer_down();
        controls.pointer_moved(Vec2::new(200.0, 100.0), 800.0);
        controls.pointer_up();

        assert!(controls.update(&mut camera));
        let first_step = camera.eye;
        assert!((first_step.length() - 2.0).abs() < 1e-4);
        assert!(first_step.x < 0.0);

        for _ in 0..2000 {
            controls.update(&mut camera);
        }
        let settled = camera.eye;
        assert!(!controls.update(&mut camera));
        assert!((camera.eye - settled).length() < 1e-5);
    }

    #[test]
    fn moving_without_drag_does_nothing() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(0.03);

        controls.pointer_moved(Vec2::new(0.0, 0.0), 800.0);
        controls.pointer_moved(Vec2::new(300.0, 300.0), 800.0);

        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(1.0);

        controls.pointer_moved(Vec2::ZERO, 100.0);
        controls.pointer_down();
        controls.pointer_moved(Vec2::new(0.0, 1000.0), 100.0);
        controls.update(&mut camera);

        assert!(camera.eye.y > 1.99);
        assert!(camera.eye.x.hypot(camera.eye.z) > 0.0);
        assert!(camera.get_vp_matrix().is_finite());
    }

    #[test]
    fn wheel_dollies_within_limits() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(0.03);

        controls.wheel(1.0);
        controls.update(&mut camera);
        assert!((camera.eye.length() - 1.9).abs() < 1e-4);

        for _ in 0..200 {
            controls.wheel(-1.0);
            controls.update(&mut camera);
        }
        assert!((camera.eye.length() - controls.max_distance).abs() < 1e-4);
    }

    #[test]
    fn aspect_ignores_empty_viewport() {
        let mut camera = camera();
        camera.set_aspect(Vec2::new(1600.0, 800.0));
        assert_eq!(camera.aspect, 2.0);

        camera.set_aspect(Vec2::new(0.0, 800.0));
        assert_eq!(camera.aspect, 2.0);
    }
}
