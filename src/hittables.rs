//! Surfaces that rays can hit, and the record of a hit.
//!
//! The closed set of shapes is [Triangle], [Sphere] and [Model]; [Primitive] is the
//! tagged union the scene stores, dispatching every [Hittable] query to its variant.

use glam::{Vec2, Vec3A};
use rand::Rng;

use crate::{bounds::BoundingBox, color::Color, material::Material, ray::Ray};

mod model;
mod sphere;
mod triangle;

pub use model::Model;
pub use sphere::Sphere;
pub use triangle::Triangle;

/// A non-owning handle to the elementary surface that produced an [Intersection].
#[derive(Debug, Clone, Copy)]
pub enum SurfaceRef<'a> {
    Triangle(&'a Triangle),
    Sphere(&'a Sphere),
}

impl<'a> SurfaceRef<'a> {
    /// Diffuse color of the surface at `texcoord`.
    pub fn eval_diffuse(&self, texcoord: Vec2) -> Color {
        match self {
            SurfaceRef::Triangle(t) => t.eval_diffuse(texcoord),
            SurfaceRef::Sphere(s) => s.eval_diffuse(texcoord),
        }
    }

    /// Shading normal and texture coordinate at a hit, see [Hittable::surface_props].
    pub fn surface_props(&self, point: Vec3A, direction: Vec3A, uv: Vec2) -> (Vec3A, Vec2) {
        match self {
            SurfaceRef::Triangle(t) => t.surface_props(point, direction, 0, uv),
            SurfaceRef::Sphere(s) => s.surface_props(point, direction, 0, uv),
        }
    }
}

/// Result of a ray query or of sampling a point on a surface.
///
/// A miss has `hit == false` and `distance == f32::INFINITY`.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    pub hit: bool,
    pub position: Vec3A,
    /// geometric normal at `position`
    pub normal: Vec3A,
    /// barycentric `(u, v)` for triangles, spherical `(u, v)` for spheres
    pub texcoord: Vec2,
    /// radiance emitted at `position`; only filled in when sampling lights
    pub emit: Color,
    /// ray parameter of the hit
    pub distance: f32,
    pub material: Option<&'a Material>,
    pub primitive: Option<SurfaceRef<'a>>,
}

impl Default for Intersection<'_> {
    fn default() -> Self {
        Self {
            hit: false,
            position: Vec3A::ZERO,
            normal: Vec3A::ZERO,
            texcoord: Vec2::ZERO,
            emit: Color::ZERO,
            distance: f32::INFINITY,
            material: None,
            primitive: None,
        }
    }
}

impl<'a> Intersection<'a> {
    /// Returns whichever of the two records is nearer along the ray.
    #[inline]
    pub fn closer(self, other: Intersection<'a>) -> Intersection<'a> {
        if self.distance < other.distance {
            self
        } else {
            other
        }
    }
}

/// Operations shared by every kind of surface.
pub trait Hittable {
    /// Axis aligned box enclosing the surface.
    fn bound(&self) -> BoundingBox;

    /// Surface area.
    fn area(&self) -> f32;

    /// Draws a point uniformly distributed over the surface.
    ///
    /// Returns the sampled point and its density with respect to surface area.
    fn sample(&self, rng: &mut impl Rng) -> (Intersection<'_>, f32);

    /// Returns whether the ray hits the surface at all.
    fn intersects(&self, ray: &Ray) -> bool;

    /// Returns the ray parameter of the nearest hit and the index of the hit
    /// element within the surface.
    fn intersect_nearest(&self, ray: &Ray) -> Option<(f32, u32)>;

    /// Returns the fully populated record of the nearest hit.
    fn get_intersection(&self, ray: &Ray) -> Intersection<'_>;

    fn has_emission(&self) -> bool;

    /// Diffuse color at the given texture coordinate.
    fn eval_diffuse(&self, texcoord: Vec2) -> Color;

    /// Shading normal and texture coordinate at `point`.
    ///
    /// `index` selects the element of an aggregate and `uv` carries the
    /// parametric coordinates recorded at intersection time.
    fn surface_props(&self, point: Vec3A, direction: Vec3A, index: u32, uv: Vec2)
        -> (Vec3A, Vec2);
}

/// Any surface the scene can hold.
#[derive(Debug)]
pub enum Primitive {
    Triangle(Triangle),
    Sphere(Sphere),
    Model(Model),
}

impl From<Triangle> for Primitive {
    fn from(t: Triangle) -> Self {
        Primitive::Triangle(t)
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Model> for Primitive {
    fn from(m: Model) -> Self {
        Primitive::Model(m)
    }
}

/// Forwards a method call to whichever variant `self` holds.
macro_rules! dispatch {
    ($self:ident, $p:ident => $call:expr) => {
        match $self {
            Primitive::Triangle($p) => $call,
            Primitive::Sphere($p) => $call,
            Primitive::Model($p) => $call,
        }
    };
}

impl Hittable for Primitive {
    fn bound(&self) -> BoundingBox {
        dispatch!(self, p => p.bound())
    }

    fn area(&self) -> f32 {
        dispatch!(self, p => p.area())
    }

    fn sample(&self, rng: &mut impl Rng) -> (Intersection<'_>, f32) {
        dispatch!(self, p => p.sample(rng))
    }

    fn intersects(&self, ray: &Ray) -> bool {
        dispatch!(self, p => p.intersects(ray))
    }

    fn intersect_nearest(&self, ray: &Ray) -> Option<(f32, u32)> {
        dispatch!(self, p => p.intersect_nearest(ray))
    }

    fn get_intersection(&self, ray: &Ray) -> Intersection<'_> {
        dispatch!(self, p => p.get_intersection(ray))
    }

    fn has_emission(&self) -> bool {
        dispatch!(self, p => p.has_emission())
    }

    fn eval_diffuse(&self, texcoord: Vec2) -> Color {
        dispatch!(self, p => p.eval_diffuse(texcoord))
    }

    fn surface_props(
        &self,
        point: Vec3A,
        direction: Vec3A,
        index: u32,
        uv: Vec2,
    ) -> (Vec3A, Vec2) {
        dispatch!(self, p => p.surface_props(point, direction, index, uv))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn default_is_a_miss() {
        let rec = Intersection::default();
        assert!(!rec.hit);
        assert_eq!(rec.distance, f32::INFINITY);
        assert!(rec.material.is_none() && rec.primitive.is_none());
    }

    #[test]
    fn closer_prefers_smaller_distance() {
        let near = Intersection {
            hit: true,
            distance: 1.0,
            ..Default::default()
        };
        let far = Intersection {
            hit: true,
            distance: 2.0,
            ..Default::default()
        };
        assert_eq!(near.closer(far).distance, 1.0);
        assert_eq!(far.closer(near).distance, 1.0);
        assert!(Intersection::default().closer(far).hit);
    }

    #[test]
    fn primitive_dispatch() {
        let mat = Arc::new(Material::emissive(Color::ONE, Color::splat(2.0)));
        let sphere: Primitive = Sphere::new(Vec3A::ZERO, 2.0, Some(mat.clone())).into();
        let tri: Primitive =
            Triangle::new(Vec3A::ZERO, Vec3A::X, Vec3A::Y, Some(Arc::new(Material::default())))
                .into();

        assert!((sphere.area() - 16.0 * std::f32::consts::PI).abs() < 1e-3);
        assert!(sphere.has_emission());
        assert!((tri.area() - 0.5).abs() < 1e-6);
        assert!(!tri.has_emission());

        let ray = Ray::new(Vec3A::new(0.0, 0.0, -5.0), Vec3A::Z, 0.0);
        let rec = sphere.get_intersection(&ray);
        assert!(rec.hit);
        assert!(matches!(rec.primitive, Some(SurfaceRef::Sphere(_))));
        assert!(std::ptr::eq(rec.material.unwrap(), mat.as_ref()));
    }
}
