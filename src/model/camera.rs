use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, TAU};

use glam::{Mat4, Vec3, Vec4Swizzles};

use super::bounds::Ray;

/// Keeps the camera off the poles so `look_at` never degenerates.
const ELEVATION_MARGIN: f32 = 0.1;
/// Pixels per world unit of the orthographic projection.
const PIXELS_PER_UNIT: f32 = 8.0;
const DEPTH_RANGE: f32 = 200.0;

/// Axis a rotation request acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Orthographic camera orbiting the world origin on a sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    /// Angle around the vertical axis, never wrapped.
    pub azimuth: f32,
    pub elevation: f32,
    pub radius: f32,
    width: u32,
    height: u32,
}

impl OrbitCamera {
    pub fn new(radius: f32, width: u32, height: u32) -> Self {
        Self {
            azimuth: FRAC_PI_4,
            elevation: FRAC_PI_6,
            radius,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Turns the camera by `amount` full revolutions. Up/Down move the
    /// elevation (clamped short of the poles), Left/Right the azimuth.
    pub fn rotate(&mut self, direction: Direction, amount: f32) {
        match direction {
            Direction::Up | Direction::Down => {
                let limit = FRAC_PI_2 - ELEVATION_MARGIN;
                self.elevation = (self.elevation + amount * TAU).clamp(-limit, limit);
            }
            Direction::Left | Direction::Right => {
                self.azimuth -= amount * TAU;
            }
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.radius * Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        let half_w = self.width as f32 / PIXELS_PER_UNIT / 2.0;
        let half_h = self.height as f32 / PIXELS_PER_UNIT / 2.0;
        Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, -DEPTH_RANGE, DEPTH_RANGE)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray through the pixel `(x, y)` from the near to the far clip plane.
    pub fn cursor_ray(&self, x: f32, y: f32) -> Ray {
        let ndc_x = 2.0 * x / self.width as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * y / self.height as f32;
        let inverse = self.view_proj().inverse();

        let unproject = |depth: f32| {
            let p = inverse * glam::Vec4::new(ndc_x, ndc_y, depth, 1.0);
            p.xyz() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);
        Ray::new(near, far - near)
    }

    /// Point where the cursor ray meets the screen-dependent depth plane used
    /// when nothing is under the cursor. Falls back to the origin when the
    /// plane is behind the ray.
    pub fn cursor_depth_point(&self, x: f32, y: f32) -> Vec3 {
        let ray = self.cursor_ray(x, y);
        let offset = -(x * 60.0 / self.width as f32 - y * 60.0 / self.height as f32);
        match ray.intersect_plane(ray.direction, offset) {
            Some(t) => ray.at(t),
            None => Vec3::ZERO,
        }
    }
}
