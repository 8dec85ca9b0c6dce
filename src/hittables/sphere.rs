//! Analytic sphere primitive.

use std::{
    f32::consts::{PI, TAU},
    sync::Arc,
};

use glam::{Vec2, Vec3A};
use rand::Rng;

use crate::{
    bounds::BoundingBox,
    color::Color,
    hittables::{Hittable, Intersection, SurfaceRef},
    material::Material,
    ray::Ray,
    utils::random::rand_vec3_on_unit_sphere,
};

/// Fraction of the radius below which a root counts as the ray's own origin.
const SELF_HIT_EPSILON: f32 = 1e-4;

/// Solves `a t² + b t + c = 0`, returning the real roots in ascending order.
///
/// Uses the cancellation-free form `q = -(b ± √Δ) / 2`, `t₀ = q / a`, `t₁ = c / q`.
fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    let discr = b * b - 4.0 * a * c;
    if discr < 0.0 {
        return None;
    }
    if discr == 0.0 {
        let t = -0.5 * b / a;
        return Some((t, t));
    }

    let q = if b > 0.0 {
        -0.5 * (b + discr.sqrt())
    } else {
        -0.5 * (b - discr.sqrt())
    };
    let (x0, x1) = (q / a, c / q);
    Some(if x0 > x1 { (x1, x0) } else { (x0, x1) })
}

/// Spherical texture coordinates of the unit direction `n`.
fn spherical_uv(n: Vec3A) -> Vec2 {
    let phi = n.z.atan2(n.x);
    let theta = n.y.clamp(-1.0, 1.0).acos();
    Vec2::new((phi + PI) / TAU, theta / PI)
}

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Vec3A,
    pub radius: f32,
    pub material: Option<Arc<Material>>,
}

impl Sphere {
    pub fn new(center: Vec3A, radius: f32, material: Option<Arc<Material>>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

impl Hittable for Sphere {
    fn bound(&self) -> BoundingBox {
        let r = Vec3A::splat(self.radius);
        BoundingBox::new(self.center - r, self.center + r)
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn sample(&self, rng: &mut impl Rng) -> (Intersection<'_>, f32) {
        let dir = rand_vec3_on_unit_sphere(rng);

        let material = self.material.as_deref();
        let pos = Intersection {
            hit: true,
            position: self.center + dir * self.radius,
            normal: dir,
            texcoord: spherical_uv(dir),
            emit: material.map_or(Color::ZERO, |m| m.emission),
            material,
            primitive: Some(SurfaceRef::Sphere(self)),
            ..Default::default()
        };
        (pos, self.area().recip())
    }

    fn intersects(&self, ray: &Ray) -> bool {
        self.intersect_nearest(ray).is_some()
    }

    /// Prefers the smaller root, falling back to the larger one when the ray
    /// starts inside the sphere.
    ///
    /// Roots within [SELF_HIT_EPSILON] radii of the origin are skipped, so a ray
    /// leaving a point on the surface does not hit the sphere it starts on.
    fn intersect_nearest(&self, ray: &Ray) -> Option<(f32, u32)> {
        let l = ray.origin - self.center;
        let a = ray.direction.dot(ray.direction);
        let b = 2.0 * ray.direction.dot(l);
        let c = l.dot(l) - self.radius * self.radius;

        let (t0, t1) = solve_quadratic(a, b, c)?;
        let t_min = SELF_HIT_EPSILON * self.radius;
        let t = if t0 <= t_min { t1 } else { t0 };
        (t > t_min).then_some((t, 0))
    }

    fn get_intersection(&self, ray: &Ray) -> Intersection<'_> {
        let Some((t, index)) = self.intersect_nearest(ray) else {
            return Intersection::default();
        };

        let position = ray.at(t);
        let (normal, texcoord) = self.surface_props(position, ray.direction, index, Vec2::ZERO);
        Intersection {
            hit: true,
            position,
            normal,
            texcoord,
            distance: t,
            material: self.material.as_deref(),
            primitive: Some(SurfaceRef::Sphere(self)),
            ..Default::default()
        }
    }

    fn has_emission(&self) -> bool {
        self.material.as_ref().map_or(false, |m| m.has_emission())
    }

    fn eval_diffuse(&self, _texcoord: Vec2) -> Color {
        self.material.as_ref().map_or(Color::ONE, |m| m.kd)
    }

    fn surface_props(
        &self,
        point: Vec3A,
        _direction: Vec3A,
        _index: u32,
        _uv: Vec2,
    ) -> (Vec3A, Vec2) {
        let normal = (point - self.center).normalize_or_zero();
        (normal, spherical_uv(normal))
    }
}
