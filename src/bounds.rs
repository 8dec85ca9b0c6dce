//! Implementation of bounding volumes

use glam::Vec3A;

use crate::ray::Ray;

/// An axis aligned bounding box
///
/// The [Default] box is empty: its `min` is larger than its `max` on every axis,
/// which makes it the identity of [BoundingBox::merge].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3A,
    pub max: Vec3A,
}

impl BoundingBox {
    /// Creates a new Axis aligned bounding box
    pub fn new(p0: Vec3A, p1: Vec3A) -> Self {
        Self {
            min: p0.min(p1),
            max: p0.max(p1),
        }
    }

    /// Creates the degenerate box containing only `point`.
    pub fn from_point(point: Vec3A) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Returns the parametric interval `(t_enter, t_exit)` over which the ray lies
    /// inside the box's three slabs, using the ray's precomputed inverse direction.
    ///
    /// The interval is empty when `t_enter > t_exit`.
    pub fn slab_interval(&self, ray: &Ray, ray_dir_inv: Vec3A) -> (f32, f32) {
        let diff0 = self.min - ray.origin;
        let diff1 = self.max - ray.origin;

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis_idx in 0..3 {
            let inverse_dir = ray_dir_inv[axis_idx];
            let t0 = diff0[axis_idx] * inverse_dir;
            let t1 = diff1[axis_idx] * inverse_dir;

            // an origin on a face of a slab parallel to the ray gives `0 * inf = NaN`,
            // which `f32::max`/`f32::min` skip
            t_near = t_near.max(t0).min(t_near.max(t1));
            t_far = t_far.min(t0).max(t_far.min(t1));
        }

        (t_near, t_far)
    }

    /// Returns whether or not the ray hits this bounding box, using the ray's precomputed inverse direction.
    ///
    /// The box is hit when the slab interval is non-empty and does not lie entirely
    /// behind the ray's origin. No epsilon is applied, so grazing hits are accepted.
    pub fn intersect_p(&self, ray: &Ray, ray_dir_inv: Vec3A) -> bool {
        let (t_enter, t_exit) = self.slab_interval(ray, ray_dir_inv);
        t_enter <= t_exit && t_exit >= 0.0
    }

    /// Returns a bounding box enclosing this and the other box.
    ///
    /// In other words, combines the two boxes by taking:
    /// * the minimums of the two boxes' min members
    /// * the maximums of the two boxes' max members
    pub fn merge(&self, other: &BoundingBox) -> BoundingBox {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns the smallest box enclosing this box and `point`.
    pub fn merge_point(&self, point: Vec3A) -> BoundingBox {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Returns the overlapping region of the two boxes.
    ///
    /// If the boxes do not overlap the result is empty on at least one axis.
    pub fn intersection(&self, other: &BoundingBox) -> BoundingBox {
        Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    pub fn diagonal(&self) -> Vec3A {
        self.max - self.min
    }

    pub fn surface_area(&self) -> f32 {
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Index of the axis along which the box is longest.
    pub fn max_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Position of `point` relative to the box, `(0,0,0)` at `min` and `(1,1,1)` at `max`.
    ///
    /// Axes on which the box is flat are left un-normalized.
    pub fn offset(&self, point: Vec3A) -> Vec3A {
        let mut o = point - self.min;
        let d = self.diagonal();
        for axis in 0..3 {
            if d[axis] > 0.0 {
                o[axis] /= d[axis];
            }
        }
        o
    }

    pub fn centroid(&self) -> Vec3A {
        0.5 * (self.min + self.max)
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.max.cmpge(other.min).all() && self.min.cmple(other.max).all()
    }

    pub fn inside(&self, point: Vec3A) -> bool {
        self.max.cmpge(point).all() && self.min.cmple(point).all()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3A::splat(f32::MAX),
            max: Vec3A::splat(f32::MIN),
        }
    }
}
