//! Triangle mesh aggregate with its own acceleration structure.

use std::sync::Arc;

use glam::{Vec2, Vec3A};
use rand::Rng;

use crate::{
    bounds::BoundingBox,
    bvh::BvhAccel,
    color::Color,
    hittables::{Hittable, Intersection, Triangle},
    material::Material,
    ray::Ray,
};

/// Checkerboard colors used by [Model::eval_diffuse].
const CHECKER_EVEN: Color = Color::new(0.815, 0.235, 0.031);
const CHECKER_ODD: Color = Color::new(0.937, 0.937, 0.231);
const CHECKER_SCALE: f32 = 5.0;

/// A mesh of triangles that behaves as one primitive.
///
/// The model owns its triangles, the materials they reference and a private
/// [BvhAccel] over the triangles, so a scene-level BVH over models forms a
/// two-level hierarchy.
#[derive(Debug)]
pub struct Model {
    triangles: Vec<Triangle>,
    materials: Vec<Arc<Material>>,
    bvh: BvhAccel,
    bounding_box: BoundingBox,
    total_area: f32,
    has_emission: bool,
}

impl Model {
    /// Creates a model from finished triangles.
    ///
    /// Triangles without a material are assigned `default_material`. `materials`
    /// lists the materials owned by this model; triangles may also reference
    /// materials owned elsewhere.
    pub fn new(
        mut triangles: Vec<Triangle>,
        materials: Vec<Arc<Material>>,
        default_material: Option<Arc<Material>>,
    ) -> Self {
        let mut bounding_box = BoundingBox::default();
        let mut total_area = 0.0;
        let mut has_emission = false;

        for triangle in &mut triangles {
            if triangle.material.is_none() {
                triangle.material = default_material.clone();
            }
            has_emission |= triangle.has_emission();
            total_area += triangle.area();
            bounding_box = bounding_box.merge(&triangle.bound());
        }

        let bvh = BvhAccel::new(&triangles);
        log::debug!(
            "model: {} triangles, area {total_area}, bvh depth {}",
            triangles.len(),
            bvh.depth()
        );

        Self {
            triangles,
            materials,
            bvh,
            bounding_box,
            total_area,
            has_emission,
        }
    }

    /// Creates a flat-shaded model from indexed positions, all faces sharing `material`.
    ///
    /// Faces referencing a position out of range are skipped.
    pub fn from_indexed(positions: &[Vec3A], faces: &[[usize; 3]], material: Arc<Material>) -> Self {
        let triangles = faces
            .iter()
            .filter_map(|&[i0, i1, i2]| {
                match (positions.get(i0), positions.get(i1), positions.get(i2)) {
                    (Some(&v0), Some(&v1), Some(&v2)) => Some(Triangle::new(v0, v1, v2, None)),
                    _ => {
                        log::warn!("skipping face [{i0}, {i1}, {i2}]: index out of range");
                        None
                    }
                }
            })
            .collect();

        Self::new(triangles, vec![material.clone()], Some(material))
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn materials(&self) -> &[Arc<Material>] {
        &self.materials
    }
}

impl Hittable for Model {
    fn bound(&self) -> BoundingBox {
        self.bounding_box
    }

    fn area(&self) -> f32 {
        self.total_area
    }

    fn sample(&self, rng: &mut impl Rng) -> (Intersection<'_>, f32) {
        self.bvh.sample(&self.triangles, rng)
    }

    fn intersects(&self, ray: &Ray) -> bool {
        self.bvh.intersect(&self.triangles, ray).hit
    }

    /// Exhaustive scan over every triangle, bypassing the BVH.
    fn intersect_nearest(&self, ray: &Ray) -> Option<(f32, u32)> {
        self.triangles
            .iter()
            .enumerate()
            .filter_map(|(i, tri)| tri.intersect_nearest(ray).map(|(t, _)| (t, i as u32)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    fn get_intersection(&self, ray: &Ray) -> Intersection<'_> {
        self.bvh.intersect(&self.triangles, ray)
    }

    fn has_emission(&self) -> bool {
        self.has_emission
    }

    /// Procedural checkerboard in texture space.
    fn eval_diffuse(&self, texcoord: Vec2) -> Color {
        let odd = ((texcoord.x * CHECKER_SCALE) % 1.0 > 0.5) ^ ((texcoord.y * CHECKER_SCALE) % 1.0 > 0.5);
        if odd {
            CHECKER_ODD
        } else {
            CHECKER_EVEN
        }
    }

    fn surface_props(&self, point: Vec3A, direction: Vec3A, index: u32, uv: Vec2) -> (Vec3A, Vec2) {
        match self.triangles.get(index as usize) {
            Some(tri) => tri.surface_props(point, direction, index, uv),
            None => (Vec3A::Z, Vec2::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;

    /// Unit square in the y = 0 plane facing +y, split into two triangles.
    fn floor(material: Arc<Material>) -> Model {
        let positions = [
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(1.0, 0.0, 1.0),
            Vec3A::new(0.0, 0.0, 1.0),
        ];
        Model::from_indexed(&positions, &[[0, 2, 1], [0, 3, 2]], material)
    }

    #[test]
    fn aggregates() {
        let model = floor(Arc::new(Material::diffuse(Color::ONE)));
        assert_eq!(model.triangles().len(), 2);
        assert!((model.area() - 1.0).abs() < 1e-6);
        assert_eq!(
            model.bound(),
            BoundingBox::new(Vec3A::ZERO, Vec3A::new(1.0, 0.0, 1.0))
        );
        assert!(!model.has_emission());
        assert!(model.triangles().iter().all(|t| t.material.is_some()));
        assert_eq!(model.materials().len(), 1);
    }

    #[test]
    fn skips_bad_faces() {
        let positions = [Vec3A::ZERO, Vec3A::X, Vec3A::Z];
        let model = Model::from_indexed(
            &positions,
            &[[0, 2, 1], [0, 1, 7]],
            Arc::new(Material::default()),
        );
        assert_eq!(model.triangles().len(), 1);
    }

    #[test]
    fn emission_from_default_material() {
        let light = Arc::new(Material::emissive(Color::ONE, Color::splat(5.0)));
        assert!(floor(light).has_emission());
    }

    #[test]
    fn bvh_and_scan_agree() {
        let model = floor(Arc::new(Material::diffuse(Color::ONE)));
        for (x, z) in [(0.2, 0.7), (0.8, 0.1), (0.5, 0.5), (1.5, 0.5)] {
            let ray = Ray::new(Vec3A::new(x, 3.0, z), -Vec3A::Y, 0.0);
            let rec = model.get_intersection(&ray);
            let scan = model.intersect_nearest(&ray);
            assert_eq!(rec.hit, scan.is_some());
            assert_eq!(rec.hit, model.intersects(&ray));
            if let Some((t, index)) = scan {
                assert!((t - rec.distance).abs() < 1e-5);
                assert!((t - 3.0).abs() < 1e-5);

                let (n, _) = model.surface_props(rec.position, ray.direction, index, rec.texcoord);
                assert!((n - Vec3A::Y).length() < 1e-5);
            }
        }
    }

    #[test]
    fn samples_cover_the_mesh() {
        let model = floor(Arc::new(Material::emissive(Color::ONE, Color::splat(2.0))));
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1000 {
            let (pos, pdf) = model.sample(&mut rng);
            assert!(pos.hit);
            assert!(model.bound().inside(pos.position));
            assert!((pdf - 1.0 / model.area()).abs() < 1e-4);
            assert_eq!(pos.emit, Color::splat(2.0));
        }
    }

    #[test]
    fn checkerboard() {
        let model = floor(Arc::new(Material::default()));
        assert_eq!(model.eval_diffuse(Vec2::new(0.05, 0.05)), CHECKER_EVEN);
        assert_eq!(model.eval_diffuse(Vec2::new(0.15, 0.05)), CHECKER_ODD);
        assert_eq!(model.eval_diffuse(Vec2::new(0.15, 0.15)), CHECKER_EVEN);
    }
}
