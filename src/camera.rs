// camera.rs — fixed camera at the sphere centre, and cursor -> view ray

use glam::{Mat4, Vec3};

const NEAR: f32 = 0.01;

/// Angles in degrees. Yaw 0 / pitch 0 looks down +X, which is u = 0 of the panorama.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn new(yaw: f32, pitch: f32, fov: f32, aspect: f32) -> Self {
        Self {
            yaw,
            pitch,
            fov,
            aspect,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn forward(&self) -> Vec3 {
        // ±90° would make the up vector parallel to the view direction.
        let pitch = self.pitch.clamp(-89.9, 89.9).to_radians();
        let yaw = self.yaw.to_radians();
        Vec3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin())
    }

    fn fov_rad(&self) -> f32 {
        self.fov.clamp(1.0, 179.0).to_radians()
    }

    /// View-projection for a sphere of `radius` around the camera.
    pub fn view_proj(&self, radius: f32) -> Mat4 {
        let view = Mat4::look_to_rh(Vec3::ZERO, self.forward(), Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_rad(), self.aspect, NEAR, radius * 2.0);
        proj * view
    }

    /// World-space direction through a cursor position given in physical
    /// pixels, origin top-left.
    pub fn ray_direction(&self, cursor_x: f32, cursor_y: f32, width: u32, height: u32) -> Vec3 {
        let ndc_x = 2.0 * cursor_x / width.max(1) as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * cursor_y / height.max(1) as f32;

        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        let half = (self.fov_rad() * 0.5).tan();

        (forward + right * (ndc_x * half * self.aspect) + up * (ndc_y * half)).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_default_looks_down_x() {
        let cam = Camera::new(0.0, 0.0, 75.0, 16.0 / 9.0);
        assert!(close(cam.forward(), Vec3::X));
    }

    #[test]
    fn test_yaw_turns_towards_z() {
        let cam = Camera::new(90.0, 0.0, 75.0, 1.0);
        assert!(close(cam.forward(), Vec3::Z));
    }

    #[test]
    fn test_centre_ray_is_forward() {
        let cam = Camera::new(30.0, 20.0, 60.0, 1.5);
        let ray = cam.ray_direction(600.0, 400.0, 1200, 800);
        assert!(close(ray, cam.forward()));
    }

    #[test]
    fn test_right_of_screen_is_larger_azimuth() {
        let cam = Camera::new(0.0, 0.0, 60.0, 1.0);
        let ray = cam.ray_direction(1000.0, 500.0, 1000, 1000);
        assert!(ray.z > 0.0, "{ray:?}");
        let top = cam.ray_direction(500.0, 0.0, 1000, 1000);
        assert!(top.y > 0.0, "{top:?}");
    }

    #[test]
    fn test_ray_projects_back_to_cursor() {
        let cam = Camera::new(-40.0, 15.0, 70.0, 1280.0 / 720.0);
        let vp = cam.view_proj(10.0);
        for (x, y) in [(100.0, 200.0), (640.0, 360.0), (1200.0, 50.0)] {
            let ray = cam.ray_direction(x, y, 1280, 720);
            let ndc = vp.project_point3(ray * 5.0);
            let px = (ndc.x + 1.0) * 0.5 * 1280.0;
            let py = (1.0 - ndc.y) * 0.5 * 720.0;
            assert!((px - x).abs() < 0.5 && (py - y).abs() < 0.5, "({x}, {y}) -> ({px}, {py})");
        }
    }
}
