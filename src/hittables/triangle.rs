//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use glam::{Vec2, Vec3A};
use rand::Rng;

use crate::{
    bounds::BoundingBox,
    color::Color,
    hittables::{Hittable, Intersection, SurfaceRef},
    material::Material,
    ray::Ray,
    utils::random::rand_barycentric,
};

/// Determinants smaller than this mean the ray runs parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A triangle with per-vertex normals and texture coordinates.
///
/// Only the front face, the side `(v1 - v0) × (v2 - v0)` points to, can be hit.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub v0: Vec3A,
    pub v1: Vec3A,
    pub v2: Vec3A,
    pub n0: Vec3A,
    pub n1: Vec3A,
    pub n2: Vec3A,
    pub t0: Vec2,
    pub t1: Vec2,
    pub t2: Vec2,
    /// cached surface area
    sarea: f32,
    pub material: Option<Arc<Material>>,
}

/// Intersects the ray `origin + t * direction` with the triangle `(v0, v1, v2)`.
///
/// Returns `(t, u, v)` where `u` and `v` are the barycentric weights of `v1` and `v2`.
/// Hits behind the origin are rejected; both faces are accepted.
pub fn moller_trumbore(
    v0: Vec3A,
    v1: Vec3A,
    v2: Vec3A,
    origin: Vec3A,
    direction: Vec3A,
) -> Option<(f32, f32, f32)> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = direction.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let inv_det = det.recip();
    let tvec = origin - v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < 0.0 {
        return None;
    }

    Some((t, u, v))
}

impl Triangle {
    /// Creates a flat-shaded triangle.
    ///
    /// Every vertex normal is the face normal and the texture coordinates are
    /// `(0,0)`, `(1,0)`, `(0,1)`.
    pub fn new(v0: Vec3A, v1: Vec3A, v2: Vec3A, material: Option<Arc<Material>>) -> Self {
        let n = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self::with_attributes(
            [v0, v1, v2],
            [n; 3],
            [Vec2::ZERO, Vec2::X, Vec2::Y],
            material,
        )
    }

    /// Creates a triangle with explicit vertex normals and texture coordinates.
    pub fn with_attributes(
        positions: [Vec3A; 3],
        normals: [Vec3A; 3],
        texcoords: [Vec2; 3],
        material: Option<Arc<Material>>,
    ) -> Self {
        let [v0, v1, v2] = positions;
        let [n0, n1, n2] = normals;
        let [t0, t1, t2] = texcoords;
        Self {
            v0,
            v1,
            v2,
            n0,
            n1,
            n2,
            t0,
            t1,
            t2,
            sarea: 0.5 * (v1 - v0).cross(v2 - v0).length(),
            material,
        }
    }

    /// Unit normal of the front face.
    pub fn face_normal(&self) -> Vec3A {
        (self.v1 - self.v0).cross(self.v2 - self.v0).normalize_or_zero()
    }

    /// Front-face hit as `(t, u, v)`.
    fn hit_front(&self, ray: &Ray) -> Option<(f32, f32, f32)> {
        if ray.direction.dot(self.face_normal()) > 0.0 {
            return None;
        }
        moller_trumbore(self.v0, self.v1, self.v2, ray.origin, ray.direction)
    }
}

impl Hittable for Triangle {
    fn bound(&self) -> BoundingBox {
        BoundingBox::new(self.v0.min(self.v1).min(self.v2), self.v0.max(self.v1).max(self.v2))
    }

    fn area(&self) -> f32 {
        self.sarea
    }

    fn sample(&self, rng: &mut impl Rng) -> (Intersection<'_>, f32) {
        let b = rand_barycentric(rng);
        let w = 1.0 - b.x - b.y;

        let material = self.material.as_deref();
        let pos = Intersection {
            hit: true,
            position: w * self.v0 + b.x * self.v1 + b.y * self.v2,
            normal: self.face_normal(),
            texcoord: b,
            emit: material.map_or(Color::ZERO, |m| m.emission),
            material,
            primitive: Some(SurfaceRef::Triangle(self)),
            ..Default::default()
        };
        (pos, self.area().recip())
    }

    fn intersects(&self, ray: &Ray) -> bool {
        self.hit_front(ray).is_some()
    }

    fn intersect_nearest(&self, ray: &Ray) -> Option<(f32, u32)> {
        self.hit_front(ray).map(|(t, _, _)| (t, 0))
    }

    fn get_intersection(&self, ray: &Ray) -> Intersection<'_> {
        match self.hit_front(ray) {
            Some((t, u, v)) => Intersection {
                hit: true,
                position: ray.at(t),
                normal: self.face_normal(),
                texcoord: Vec2::new(u, v),
                distance: t,
                material: self.material.as_deref(),
                primitive: Some(SurfaceRef::Triangle(self)),
                ..Default::default()
            },
            None => Intersection::default(),
        }
    }

    fn has_emission(&self) -> bool {
        self.material.as_ref().map_or(false, |m| m.has_emission())
    }

    fn eval_diffuse(&self, _texcoord: Vec2) -> Color {
        self.material.as_ref().map_or(Color::ONE, |m| m.kd)
    }

    /// Interpolates the vertex normals and texture coordinates with the
    /// barycentric weights `(1 - u - v, u, v)`.
    fn surface_props(
        &self,
        _point: Vec3A,
        _direction: Vec3A,
        _index: u32,
        uv: Vec2,
    ) -> (Vec3A, Vec2) {
        let w = 1.0 - uv.x - uv.y;
        let normal = (w * self.n0 + uv.x * self.n1 + uv.y * self.n2).normalize_or_zero();
        let texcoord = w * self.t0 + uv.x * self.t1 + uv.y * self.t2;
        (normal, texcoord)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;

    /// Triangle in the z = 0 plane facing -Z, towards a camera at negative z.
    fn facing_camera() -> Triangle {
        Triangle::new(
            Vec3A::new(-1.0, -1.0, 0.0),
            Vec3A::new(0.0, 2.0, 0.0),
            Vec3A::new(2.0, -1.0, 0.0),
            Some(Arc::new(Material::diffuse(Color::splat(0.5)))),
        )
    }

    #[test]
    fn face_normal_and_area() {
        let tri = facing_camera();
        assert!((tri.face_normal() - (-Vec3A::Z)).length() < 1e-6);
        assert!((tri.area() - 4.5).abs() < 1e-6);
        assert_eq!(
            tri.bound(),
            BoundingBox::new(Vec3A::new(-1.0, -1.0, 0.0), Vec3A::new(2.0, 2.0, 0.0))
        );
    }

    #[test]
    fn barycentric_round_trip() {
        let tri = facing_camera();
        for (u0, v0) in [(0.2, 0.3), (0.1, 0.8), (0.45, 0.45), (0.7, 0.05)] {
            let target = (1.0 - u0 - v0) * tri.v0 + u0 * tri.v1 + v0 * tri.v2;
            let origin = Vec3A::new(0.3, -0.2, -5.0);
            let ray = Ray::new(origin, (target - origin).normalize(), 0.0);

            let rec = tri.get_intersection(&ray);
            assert!(rec.hit, "missed barycentric ({u0}, {v0})");
            assert!(rec.distance > 0.0);
            assert!((rec.texcoord.x - u0).abs() < 1e-5, "u {} vs {u0}", rec.texcoord.x);
            assert!((rec.texcoord.y - v0).abs() < 1e-5, "v {} vs {v0}", rec.texcoord.y);
            assert!((rec.position - target).length() < 1e-4);

            let (t, index) = tri.intersect_nearest(&ray).unwrap();
            assert_eq!(index, 0);
            assert!((t - rec.distance).abs() < 1e-6);
        }
    }

    #[test]
    fn rejects_misses() {
        let tri = facing_camera();
        // outside the edges
        let outside = Ray::new(Vec3A::new(5.0, 5.0, -5.0), Vec3A::Z, 0.0);
        assert!(!tri.intersects(&outside));
        // parallel to the plane
        let parallel = Ray::new(Vec3A::new(0.0, 0.0, -1.0), Vec3A::X, 0.0);
        assert!(!tri.intersects(&parallel));
        // triangle behind the origin
        let behind = Ray::new(Vec3A::new(0.0, 0.0, -5.0), -Vec3A::Z, 0.0);
        assert!(!tri.intersects(&behind));
        // hitting the back face
        let back = Ray::new(Vec3A::new(0.0, 0.0, 5.0), -Vec3A::Z, 0.0);
        assert!(!tri.get_intersection(&back).hit);

        let front = Ray::new(Vec3A::new(0.0, 0.0, -5.0), Vec3A::Z, 0.0);
        assert!(tri.intersects(&front));
    }

    #[test]
    fn static_intersection_accepts_both_faces() {
        let tri = facing_camera();
        let hit = moller_trumbore(tri.v0, tri.v1, tri.v2, Vec3A::new(0.0, 0.0, 5.0), -Vec3A::Z);
        let (t, _, _) = hit.unwrap();
        assert!((t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn samples_lie_on_triangle() {
        let tri = facing_camera();
        let mut rng = SmallRng::seed_from_u64(5);
        let n = 20_000;
        let mut inv_pdf_sum = 0.0;
        for _ in 0..n {
            let (pos, pdf) = tri.sample(&mut rng);
            assert!(pos.hit);
            assert!(pos.position.z.abs() < 1e-6);
            let b = pos.texcoord;
            assert!(b.x >= 0.0 && b.y >= 0.0 && b.x + b.y <= 1.0 + 1e-6);
            inv_pdf_sum += 1.0 / pdf;
        }
        let mean = inv_pdf_sum / n as f32;
        assert!((mean - tri.area()).abs() < 1e-3 * tri.area(), "{mean}");
    }

    #[test]
    fn interpolated_surface_props() {
        let mut tri = facing_camera();
        tri.n0 = Vec3A::X;
        tri.n1 = Vec3A::Y;
        tri.n2 = Vec3A::Z;

        let (n, t) = tri.surface_props(Vec3A::ZERO, Vec3A::Z, 0, Vec2::new(0.0, 0.0));
        assert!((n - Vec3A::X).length() < 1e-6);
        assert_eq!(t, Vec2::ZERO);

        let (n, t) = tri.surface_props(Vec3A::ZERO, Vec3A::Z, 0, Vec2::new(0.5, 0.5));
        assert!((n - Vec3A::new(0.0, 1.0, 1.0).normalize()).length() < 1e-5);
        assert_eq!(t, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn diffuse_defaults_to_white() {
        let mut tri = facing_camera();
        assert_eq!(tri.eval_diffuse(Vec2::ZERO), Color::splat(0.5));
        tri.material = None;
        assert_eq!(tri.eval_diffuse(Vec2::ZERO), Color::ONE);
        assert!(!tri.has_emission());
    }
}
