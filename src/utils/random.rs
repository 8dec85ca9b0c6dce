//! Miscelleanous utilities related to random number generation and random sampling
//!
//! Relies on the [rand] and [rand_distr] crates

use std::f32::consts::PI;

use glam::{Vec2, Vec3A};
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};

/// Generates a random [Vec3A] on the surface of the unit sphere (radius 1).
///
/// wrapper function around [UnitSphere]'s `sample` method
pub fn rand_vec3_on_unit_sphere(rng: &mut impl Rng) -> Vec3A {
    Vec3A::from_array(UnitSphere.sample(rng))
}

/// Generates a direction uniformly distributed over the hemisphere around `+Z`.
///
/// `z = |1 - 2ξ₁|`, `r = √(1 - z²)`, `φ = 2πξ₂`.
pub fn rand_vec3_on_local_hemisphere(rng: &mut impl Rng) -> Vec3A {
    let x1: f32 = rng.gen();
    let x2: f32 = rng.gen();
    let z = (1.0 - 2.0 * x1).abs();
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * x2;

    Vec3A::new(r * phi.cos(), r * phi.sin(), z)
}

/// Generates barycentric weights `(b1, b2)` uniformly distributed over a triangle.
///
/// Pairs landing outside the unit triangle are folded back in; the weight of the
/// first vertex is `1 - b1 - b2`.
pub fn rand_barycentric(rng: &mut impl Rng) -> Vec2 {
    let mut r1: f32 = rng.gen();
    let mut r2: f32 = rng.gen();
    if r1 + r2 > 1.0 {
        r1 = 1.0 - r1;
        r2 = 1.0 - r2;
    }
    Vec2::new(r1, r2)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;

    #[test]
    fn test_rand_unit_sphere() {
        let mut rng = rand::thread_rng();
        let res = rand_vec3_on_unit_sphere(&mut rng);
        assert!(
            (res.length() - 1.0).abs() < 1e-4,
            "the unit vector {res}'s length was {}",
            res.length()
        )
    }

    #[test]
    fn test_local_hemisphere() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1000 {
            let res = rand_vec3_on_local_hemisphere(&mut rng);
            assert!(res.z >= 0.0, "{res} is below the hemisphere");
            assert!(
                (res.length() - 1.0).abs() < 1e-4,
                "expected a unit vector, found {res} with length {}",
                res.length()
            );
        }
    }

    #[test]
    fn test_barycentric_inside() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..1000 {
            let b = rand_barycentric(&mut rng);
            assert!(b.x >= 0.0 && b.y >= 0.0 && b.x + b.y <= 1.0, "{b} outside");
        }
    }
}
