//! Implementation of the surface material

use std::f32::consts::{FRAC_1_PI, PI};

use glam::Vec3A;
use rand::Rng;

use crate::{color::Color, utils::random::rand_vec3_on_local_hemisphere};

/// Emission magnitudes at or below this are treated as "not a light".
const EMISSION_EPSILON: f32 = 1e-6;

/// Returns a reflected ray direction based on the given normal
///
/// Performs the following computation: `v - 2 * v.dot(n) * n`
#[inline]
pub fn reflect(v: Vec3A, n: Vec3A) -> Vec3A {
    v - n * v.dot(n) * 2.0
}

/// Returns the direction of `incident` refracted through a surface with normal `n`
/// separating air from a medium of index `ior`.
///
/// Handles rays entering and leaving the medium. Returns [Vec3A::ZERO] on total
/// internal reflection.
#[inline]
pub fn refract(incident: Vec3A, n: Vec3A, ior: f32) -> Vec3A {
    let mut cos_i = n.dot(incident).clamp(-1.0, 1.0);
    let (mut eta_i, mut eta_t) = (1.0, ior);
    let mut normal = n;
    if cos_i < 0.0 {
        cos_i = -cos_i;
    } else {
        std::mem::swap(&mut eta_i, &mut eta_t);
        normal = -n;
    }

    let eta = eta_i / eta_t;
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        Vec3A::ZERO
    } else {
        eta * incident + (eta * cos_i - k.sqrt()) * normal
    }
}

/// Returns the fraction of light reflected at a dielectric boundary.
///
/// Uses the exact (unpolarized) Fresnel equations rather than Schlick's approximation.
/// Returns `1.0` under total internal reflection.
#[inline]
pub fn fresnel(incident: Vec3A, n: Vec3A, ior: f32) -> f32 {
    let mut cos_i = n.dot(incident).clamp(-1.0, 1.0);
    let (mut eta_i, mut eta_t) = (1.0, ior);
    if cos_i > 0.0 {
        std::mem::swap(&mut eta_i, &mut eta_t);
    }

    let sin_t = eta_i / eta_t * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t >= 1.0 {
        return 1.0;
    }

    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    cos_i = cos_i.abs();
    let r_s = ((eta_t * cos_i) - (eta_i * cos_t)) / ((eta_t * cos_i) + (eta_i * cos_t));
    let r_p = ((eta_i * cos_i) - (eta_t * cos_t)) / ((eta_i * cos_i) + (eta_t * cos_t));
    (r_s * r_s + r_p * r_p) / 2.0
}

/// Transforms a direction from the local shading frame (`+Z` along `normal`) to world space.
///
/// The tangent is built from whichever of the `x`/`y` normal components is larger
/// so the basis never degenerates near a coordinate axis. A zero normal has no
/// frame; the local vector is then returned unchanged.
pub fn to_world(local: Vec3A, normal: Vec3A) -> Vec3A {
    if normal.length_squared() <= f32::EPSILON {
        return local;
    }

    let b = if normal.x.abs() > normal.y.abs() {
        let inv_len = (normal.x * normal.x + normal.z * normal.z).sqrt().recip();
        Vec3A::new(normal.z * inv_len, 0.0, -normal.x * inv_len)
    } else {
        let inv_len = (normal.y * normal.y + normal.z * normal.z).sqrt().recip();
        Vec3A::new(0.0, normal.z * inv_len, -normal.y * inv_len)
    };
    let a = b.cross(normal);

    local.x * a + local.y * b + local.z * normal
}

/// A diffuse (Lambertian) surface description, optionally emissive.
///
/// Materials are shared between primitives behind an [Arc](std::sync::Arc); the
/// specular terms are carried for completeness but the estimator only uses `kd`
/// and `emission`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// diffuse reflectance
    pub kd: Color,
    /// specular reflectance
    pub ks: Color,
    /// index of refraction
    pub ior: f32,
    /// emitted radiance
    pub emission: Color,
    pub specular_exponent: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kd: Color::ZERO,
            ks: Color::ZERO,
            ior: 1.0,
            emission: Color::ZERO,
            specular_exponent: 10.0,
        }
    }
}

impl Material {
    /// Creates a non-emissive diffuse material.
    pub fn diffuse(kd: Color) -> Self {
        Self {
            kd,
            ..Default::default()
        }
    }

    /// Creates a diffuse material that also emits `emission`.
    pub fn emissive(kd: Color, emission: Color) -> Self {
        Self {
            kd,
            emission,
            ..Default::default()
        }
    }

    pub fn has_emission(&self) -> bool {
        self.emission.length() > EMISSION_EPSILON
    }

    /// Evaluates the BRDF for light arriving along `wo` and leaving along `wi`.
    ///
    /// Returns `kd / π` when `wo` is on the side of `normal`, zero otherwise.
    pub fn eval(&self, _wi: Vec3A, wo: Vec3A, normal: Vec3A) -> Color {
        if normal.dot(wo) > 0.0 {
            self.kd * FRAC_1_PI
        } else {
            Color::ZERO
        }
    }

    /// Density of [Material::sample] producing `wo`: uniform over the hemisphere.
    pub fn pdf(&self, _wi: Vec3A, wo: Vec3A, normal: Vec3A) -> f32 {
        if normal.dot(wo) > 0.0 {
            0.5 / PI
        } else {
            0.0
        }
    }

    /// Samples a continuation direction uniformly over the hemisphere around `normal`.
    pub fn sample(&self, _wi: Vec3A, normal: Vec3A, rng: &mut impl Rng) -> Vec3A {
        to_world(rand_vec3_on_local_hemisphere(rng), normal)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;

    #[test]
    fn emission_threshold() {
        assert!(!Material::diffuse(Color::ONE).has_emission());
        assert!(Material::emissive(Color::ONE, Color::new(0.0, 0.0, 1e-3)).has_emission());
        assert!(!Material::emissive(Color::ONE, Color::splat(1e-8)).has_emission());
    }

    #[test]
    fn eval_and_pdf_respect_hemisphere() {
        let mat = Material::diffuse(Color::new(0.5, 0.25, 1.0));
        let n = Vec3A::Y;

        let above = Vec3A::new(0.3, 0.9, 0.0).normalize();
        let below = -above;

        assert_eq!(mat.eval(-Vec3A::Y, above, n), mat.kd * FRAC_1_PI);
        assert_eq!(mat.eval(-Vec3A::Y, below, n), Color::ZERO);
        assert!((mat.pdf(-Vec3A::Y, above, n) - 0.5 / PI).abs() < 1e-7);
        assert_eq!(mat.pdf(-Vec3A::Y, below, n), 0.0);
    }

    #[test]
    fn samples_stay_in_hemisphere() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mat = Material::diffuse(Color::ONE);
        let normals = [
            Vec3A::X,
            -Vec3A::Y,
            Vec3A::Z,
            Vec3A::new(1.0, 1.0, 0.0).normalize(),
            Vec3A::new(-0.2, 0.3, -0.9).normalize(),
        ];

        for n in normals {
            for _ in 0..500 {
                let wo = mat.sample(-n, n, &mut rng);
                assert!(wo.dot(n) >= -1e-5, "{wo} escaped hemisphere of {n}");
                assert!((wo.length() - 1.0).abs() < 1e-3, "{wo} is not unit length");
            }
        }
    }

    #[test]
    fn to_world_maps_z_to_normal() {
        for n in [Vec3A::X, Vec3A::Y, -Vec3A::Z, Vec3A::new(0.6, 0.0, 0.8)] {
            let w = to_world(Vec3A::Z, n);
            assert!((w - n).length() < 1e-5, "{w} != {n}");

            let t = to_world(Vec3A::X, n);
            assert!(t.dot(n).abs() < 1e-5, "tangent {t} not orthogonal to {n}");
        }
        assert_eq!(to_world(Vec3A::X, Vec3A::ZERO), Vec3A::X);
    }

    #[test]
    fn mirror_reflection() {
        let v = Vec3A::new(1.0, -1.0, 0.0);
        assert_eq!(reflect(v, Vec3A::Y), Vec3A::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn refraction_straight_through() {
        let d = -Vec3A::Y;
        let t = refract(d, Vec3A::Y, 1.5);
        assert!((t - d).length() < 1e-5, "{t}");
    }

    #[test]
    fn refraction_total_internal_reflection() {
        // leaving glass at a grazing angle
        let d = Vec3A::new(0.9, 0.1, 0.0).normalize();
        assert_eq!(refract(d, Vec3A::Y, 1.5), Vec3A::ZERO);
        assert_eq!(fresnel(d, Vec3A::Y, 1.5), 1.0);
    }

    #[test]
    fn fresnel_normal_incidence() {
        let ior: f32 = 1.5;
        let expected = ((ior - 1.0) / (ior + 1.0)).powi(2);
        let r = fresnel(-Vec3A::Y, Vec3A::Y, ior);
        assert!((r - expected).abs() < 1e-5, "{r} vs {expected}");
    }
}
