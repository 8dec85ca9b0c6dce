//! Explicit light descriptions kept alongside the scene geometry.
//!
//! The path tracer finds its lights through emissive materials; these records
//! describe light sources for consumers that want them without scanning the
//! primitives.

use glam::Vec3A;
use rand::Rng;

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Emits `intensity` from a single point.
    Point { position: Vec3A, intensity: Color },
    /// Parallelogram spanned by `u` and `v` from the corner `position`.
    Area {
        position: Vec3A,
        intensity: Color,
        u: Vec3A,
        v: Vec3A,
        normal: Vec3A,
    },
}

impl Light {
    pub fn point(position: Vec3A, intensity: Color) -> Self {
        Light::Point {
            position,
            intensity,
        }
    }

    /// Creates an area light with the given edge vectors.
    ///
    /// The normal is `u × v` normalized.
    pub fn area(position: Vec3A, intensity: Color, u: Vec3A, v: Vec3A) -> Self {
        Light::Area {
            position,
            intensity,
            u,
            v,
            normal: u.cross(v).normalize_or_zero(),
        }
    }

    /// Unit square light at `position` spanning `+x` and `+z`, facing down.
    pub fn ceiling(position: Vec3A, intensity: Color) -> Self {
        Light::area(position, intensity, Vec3A::X, Vec3A::Z)
    }

    pub fn position(&self) -> Vec3A {
        match self {
            Light::Point { position, .. } | Light::Area { position, .. } => *position,
        }
    }

    pub fn intensity(&self) -> Color {
        match self {
            Light::Point { intensity, .. } | Light::Area { intensity, .. } => *intensity,
        }
    }

    /// Picks a point on the light, uniformly over its surface.
    ///
    /// A point light always returns its position.
    pub fn sample_point(&self, rng: &mut impl Rng) -> Vec3A {
        match *self {
            Light::Point { position, .. } => position,
            Light::Area { position, u, v, .. } => {
                position + rng.gen::<f32>() * u + rng.gen::<f32>() * v
            }
        }
    }
}
