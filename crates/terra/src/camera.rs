//! Perspective camera and damped orbit controls around the globe centre.
//!
//! The camera always looks at the origin. [`OrbitControls`] accumulates
//! drag and wheel input and eases the camera towards it on each `update`.

use crate::raycast::Ray;
use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use std::f32::consts::{PI, TAU};

/// Smallest polar angle the orbit may reach; keeps `look_at` away from the up axis.
const POLAR_EPS: f32 = 1e-6;

/// Right-handed perspective camera with a `[0, 1]` depth range.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 4.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_deg: 45.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            aspect,
            ..Default::default()
        }
    }

    /// Updates the aspect ratio after a resize. Degenerate sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect.max(1e-3),
            self.near,
            self.far,
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Picking ray from the camera through a normalized device coordinate
    /// (`x` right, `y` up, both in `[-1, 1]`).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        let far = inv * ndc.extend(0.5).extend(1.0);
        let point = far.xyz() / far.w;
        Ray::new(self.position, (point - self.position).normalize())
    }
}

/// Damped orbit controller around a fixed target.
///
/// Input accumulates into a pending spherical delta; [`OrbitControls::update`]
/// applies a `damping_factor` share of it each frame and decays the rest, so
/// the camera keeps gliding for a while after the pointer stops.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    pub(crate) delta_theta: f32,
    pub(crate) delta_phi: f32,
    pub(crate) scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotates by a pointer drag of `(dx, dy)` pixels; a drag across the full
    /// viewport height turns the globe once.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.delta_theta -= TAU * dx * self.rotate_speed / h;
        self.delta_phi -= TAU * dy * self.rotate_speed / h;
    }

    /// Zooms for a wheel step. Negative `delta_y` (wheel up) moves closer.
    pub fn zoom_by_wheel(&mut self, delta_y: f32) {
        let step = 0.95f32.powf(self.zoom_speed);
        if delta_y < 0.0 {
            self.scale *= step;
        } else if delta_y > 0.0 {
            self.scale /= step;
        }
    }

    /// True while a damped rotation is still being applied.
    pub fn is_settling(&self) -> bool {
        self.delta_theta.abs() > 1e-6 || self.delta_phi.abs() > 1e-6
    }

    /// Applies pending input to `camera`. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = camera.position;
        let offset = camera.position - self.target;

        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, 0.0)
        };

        let share = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.delta_theta * share;
        phi += self.delta_phi * share;
        phi = phi.clamp(POLAR_EPS, PI - POLAR_EPS);

        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let sin_phi_r = phi.sin() * radius;
        let offset = Vec3::new(
            sin_phi_r * theta.sin(),
            phi.cos() * radius,
            sin_phi_r * theta.cos(),
        );

        camera.position = self.target + offset;
        camera.target = self.target;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;

        before.distance_squared(camera.position) > 1e-12
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = PerspectiveCamera::default();
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        assert!((ray.origin - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-6);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn ndc_corners_follow_the_field_of_view() {
        let cam = PerspectiveCamera::new(2.0);
        let half_fov = (cam.fov_y_deg * 0.5).to_radians();

        let up = cam.ray_from_ndc(Vec2::new(0.0, 1.0));
        assert!(up.direction.y > 0.0);
        let angle = up.direction.angle_between(Vec3::NEG_Z);
        assert!((angle - half_fov).abs() < 1e-3);

        let right = cam.ray_from_ndc(Vec2::new(1.0, 0.0));
        assert!(right.direction.x > 0.0);
        let expected = (half_fov.tan() * 2.0).atan();
        assert!((right.direction.angle_between(Vec3::NEG_Z) - expected).abs() < 1e-3);
    }

    #[test]
    fn resize_updates_aspect_and_ignores_zero() {
        let mut cam = PerspectiveCamera::default();
        cam.set_viewport(1600, 800);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(0, 800);
        assert_eq!(cam.aspect, 2.0);
    }

    #[test]
    fn idle_update_keeps_camera_in_place() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();
        assert!(!controls.update(&mut cam));
        assert!((cam.position - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn drag_rotation_is_damped_and_decays() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();
        controls.rotate_by_pixels(100.0, 0.0, 800.0);

        assert!(controls.update(&mut cam));
        let first = cam.position;
        // Dragging right swings the camera towards -x.
        assert!(first.x < 0.0);
        assert!((first.length() - 4.0).abs() < 1e-4);

        let mut last_step = first.distance(Vec3::new(0.0, 0.0, 4.0));
        let mut prev = first;
        for _ in 0..20 {
            controls.update(&mut cam);
            let step = cam.position.distance(prev);
            assert!(step < last_step + 1e-6);
            last_step = step;
            prev = cam.position;
        }
        assert!(controls.is_settling());
    }

    #[test]
    fn damped_rotation_converges_to_full_delta() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();
        // A quarter turn worth of drag.
        controls.rotate_by_pixels(-200.0, 0.0, 800.0);
        for _ in 0..2000 {
            controls.update(&mut cam);
        }
        assert!(!controls.is_settling());
        assert!((cam.position - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-2);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls {
            enable_damping: false,
            ..Default::default()
        };
        controls.rotate_by_pixels(0.0, 10_000.0, 100.0);
        controls.update(&mut cam);
        assert!(cam.position.is_finite());
        assert!(cam.position.y > 3.99);
    }

    #[test]
    fn wheel_zooms_in_and_out() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::new();

        controls.zoom_by_wheel(-1.0);
        controls.update(&mut cam);
        assert!((cam.position.length() - 4.0 * 0.95).abs() < 1e-4);

        controls.zoom_by_wheel(1.0);
        controls.update(&mut cam);
        assert!((cam.position.length() - 4.0).abs() < 1e-4);
    }
}
