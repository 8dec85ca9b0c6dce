//! Scene container and the Monte Carlo path tracing estimator.

use glam::Vec3A;
use rand::Rng;

use crate::{
    bvh::BvhAccel,
    color::Color,
    hittables::{Hittable, Intersection, Primitive},
    light::Light,
    ray::Ray,
};

/// Tolerance of the shadow ray distance test.
const SHADOW_EPSILON: f32 = 1e-4;

/// Light paths are cut after this many segments by default.
pub const DEFAULT_MAX_DEPTH: u32 = 3;
/// Probability of continuing a path past its direct lighting by default.
pub const DEFAULT_RUSSIAN_ROULETTE: f32 = 0.8;

/// Geometry, lights and the top-level acceleration structure.
///
/// Primitives are added first, then [Scene::build_bvh] is called once; after that
/// the scene is only read, so it can be shared between render threads.
#[derive(Debug)]
pub struct Scene {
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
    bvh: Option<BvhAccel>,
    emissive_area: f32,
    max_depth: u32,
    russian_roulette: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            primitives: Vec::new(),
            lights: Vec::new(),
            bvh: None,
            emissive_area: 0.0,
            max_depth: DEFAULT_MAX_DEPTH,
            russian_roulette: DEFAULT_RUSSIAN_ROULETTE,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the path continuation probability, clamped to `(0, 1]`.
    pub fn with_russian_roulette(mut self, probability: f32) -> Self {
        self.russian_roulette = probability.clamp(f32::EPSILON, 1.0);
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn russian_roulette(&self) -> f32 {
        self.russian_roulette
    }

    /// Adds a primitive to the scene.
    ///
    /// An already built BVH no longer covers every primitive and is discarded.
    pub fn add(&mut self, primitive: impl Into<Primitive>) {
        if self.bvh.take().is_some() {
            log::warn!("primitive added after the BVH was built; call build_bvh again");
        }

        let primitive = primitive.into();
        if primitive.has_emission() {
            self.emissive_area += primitive.area();
        }
        self.primitives.push(primitive);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Builds the top-level BVH over every primitive added so far.
    pub fn build_bvh(&mut self) {
        let bvh = BvhAccel::new(&self.primitives);
        log::info!(
            "scene BVH: {} primitives, {} nodes, depth {}",
            self.primitives.len(),
            bvh.node_count(),
            bvh.depth()
        );
        self.bvh = Some(bvh);
    }

    /// Returns the nearest intersection of `ray` with the scene.
    ///
    /// Falls back to testing every primitive when no BVH has been built.
    pub fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        match &self.bvh {
            Some(bvh) => bvh.intersect(&self.primitives, ray),
            None => self
                .primitives
                .iter()
                .map(|p| p.get_intersection(ray))
                .fold(Intersection::default(), Intersection::closer),
        }
    }

    /// Finds the nearest primitive along `ray` by testing each one in turn.
    ///
    /// Returns the ray parameter, the element index within the primitive and the
    /// primitive itself.
    pub fn trace(&self, ray: &Ray) -> Option<(f32, u32, &Primitive)> {
        self.primitives
            .iter()
            .filter_map(|p| p.intersect_nearest(ray).map(|(t, index)| (t, index, p)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    /// Picks a point on an emissive primitive, uniformly over the total emissive area.
    ///
    /// Returns the point and its density with respect to that area, or `None` when
    /// nothing in the scene emits light.
    pub fn sample_light(&self, rng: &mut impl Rng) -> Option<(Intersection<'_>, f32)> {
        if self.emissive_area <= 0.0 {
            return None;
        }

        let target = rng.gen::<f32>() * self.emissive_area;
        let mut accumulated = 0.0;
        let mut chosen = None;
        for p in self.primitives.iter().filter(|p| p.has_emission()) {
            accumulated += p.area();
            chosen = Some(p);
            if target <= accumulated {
                break;
            }
        }

        let light = chosen?;
        let (pos, pdf) = light.sample(rng);
        Some((pos, pdf * light.area() / self.emissive_area))
    }

    /// Estimates the radiance arriving at the origin of `ray` from its direction.
    ///
    /// `depth` counts the path segments already traced; paths of
    /// [Scene::max_depth] segments contribute nothing more.
    pub fn cast_ray(&self, ray: &Ray, depth: u32, rng: &mut impl Rng) -> Color {
        if depth >= self.max_depth {
            return Color::ZERO;
        }
        self.shade(ray, &self.intersect(ray), depth, rng)
    }

    /// Radiance leaving `hit` back along `ray`.
    fn shade(&self, ray: &Ray, hit: &Intersection<'_>, depth: u32, rng: &mut impl Rng) -> Color {
        if depth >= self.max_depth || !hit.hit {
            return Color::ZERO;
        }
        let Some(material) = hit.material else {
            return Color::ZERO;
        };
        if material.has_emission() {
            return material.emission;
        }

        let position = hit.position;
        let normal = hit.normal.normalize_or_zero();

        // direct lighting
        let mut direct = Color::ZERO;
        if let Some((light, light_pdf)) = self.sample_light(rng) {
            let to_light = light.position - position;
            let dist2 = to_light.length_squared();
            if dist2 > f32::EPSILON && light_pdf > 0.0 {
                let light_dist = dist2.sqrt();
                let light_dir = to_light / light_dist;

                let shadow_ray = Ray::new(position, light_dir, ray.time);
                let blocker = self.intersect(&shadow_ray);
                if blocker.distance - light_dist > -SHADOW_EPSILON {
                    let brdf = material.eval(ray.direction, light_dir, normal);
                    let cos_surface = light_dir.dot(normal).max(0.0);
                    let cos_light = (-light_dir)
                        .dot(light.normal.normalize_or_zero())
                        .max(0.0);
                    direct = light.emit * brdf * cos_surface * cos_light / dist2 / light_pdf;
                }
            }
        }

        if rng.gen::<f32>() > self.russian_roulette {
            return direct;
        }

        // indirect lighting, emitters were already counted above
        let mut indirect = Color::ZERO;
        let wo = material.sample(ray.direction, normal, rng).normalize_or_zero();
        if wo != Vec3A::ZERO {
            let next_ray = Ray::new(position, wo, ray.time);
            let next_hit = self.intersect(&next_ray);
            let emitter = next_hit.material.map_or(true, |m| m.has_emission());
            let pdf = material.pdf(ray.direction, wo, normal);
            if next_hit.hit && !emitter && pdf > 0.0 {
                let brdf = material.eval(ray.direction, wo, normal);
                let cos = wo.dot(normal).max(0.0);
                indirect = self.shade(&next_ray, &next_hit, depth + 1, rng) * brdf * cos
                    / pdf
                    / self.russian_roulette;
            }
        }

        direct + indirect
    }
}
