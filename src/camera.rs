//! Fixed pinhole camera looking down `+Z`.

use glam::Vec3A;

use crate::ray::Ray;

/// Pinhole camera at `position`, looking along `+Z` with `+Y` up.
///
/// Image columns run towards `-X`, which matches the Cornell box data where the
/// red wall at large `x` appears on the left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3A,
    /// vertical field of view in degrees
    pub fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3A::new(278.0, 273.0, -800.0), 40.0)
    }
}

impl Camera {
    pub fn new(position: Vec3A, fov: f32) -> Self {
        Self { position, fov }
    }

    /// Returns the primary ray through the center of pixel (`i`, `j`), row `j`
    /// counted from the top of an image of `width` × `height` pixels.
    pub fn get_ray(&self, i: u32, j: u32, width: u32, height: u32) -> Ray {
        let scale = (self.fov.to_radians() / 2.0).tan();
        let aspect_ratio = width as f32 / height as f32;

        let x = (2.0 * ((i as f32 + 0.5) / width as f32) - 1.0) * scale * aspect_ratio;
        let y = (1.0 - 2.0 * ((j as f32 + 0.5) / height as f32)) * scale;

        Ray::new(self.position, Vec3A::new(-x, y, 1.0).normalize(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_looks_forward() {
        let cam = Camera::default();
        let ray = cam.get_ray(1, 1, 3, 3);
        assert_eq!(ray.origin, cam.position);
        assert!((ray.direction - Vec3A::Z).length() < 1e-6);
    }

    #[test]
    fn image_orientation() {
        let cam = Camera::new(Vec3A::ZERO, 90.0);
        let top_left = cam.get_ray(0, 0, 64, 48);
        assert!(top_left.direction.x > 0.0 && top_left.direction.y > 0.0);

        let bottom_right = cam.get_ray(63, 47, 64, 48);
        assert!(bottom_right.direction.x < 0.0 && bottom_right.direction.y < 0.0);
        assert!((bottom_right.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn field_of_view_edge() {
        // top edge of a 90 degree view sits at 45 degrees
        let cam = Camera::new(Vec3A::ZERO, 90.0);
        let ray = cam.get_ray(0, 0, 1, 1000);
        let angle = ray.direction.y.atan2(ray.direction.z).to_degrees();
        assert!((angle - 45.0).abs() < 0.1, "{angle}");
    }
}
