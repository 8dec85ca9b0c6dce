//! Scene generation functionality

use std::sync::Arc;

use glam::Vec3A;

use crate::{
    camera::Camera,
    color::Color,
    hittables::{Model, Sphere, Triangle},
    light::Light,
    material::Material,
    scene::Scene,
};

/// Possible hard-coded scenes to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SceneType {
    /// Cornell Box scene from the [definitive Cornell Box data](https://www.graphics.cornell.edu/online/box/data.html),
    /// built from six triangle meshes
    CornellBox,
    /// Spheres on a floor lit by a glowing sphere
    Spheres,
}

/// Returns the chosen scene, with its BVH built, and the camera viewing it.
pub fn get_scene(scene_type: SceneType) -> (Scene, Camera) {
    match scene_type {
        SceneType::CornellBox => cornell_box(),
        SceneType::Spheres => spheres(),
    }
}

/// Splits the planar quad `corners` into two triangles whose normals point along `facing`.
pub(crate) fn quad(
    corners: [Vec3A; 4],
    facing: Vec3A,
    material: Option<Arc<Material>>,
) -> [Triangle; 2] {
    let [a, mut b, c, mut d] = corners;
    if (b - a).cross(c - a).dot(facing) < 0.0 {
        std::mem::swap(&mut b, &mut d);
    }
    [
        Triangle::new(a, b, c, material.clone()),
        Triangle::new(a, c, d, material),
    ]
}

/// Builds a single-material mesh from quads, each turned towards `facing(centroid)`.
fn mesh(quads: &[[Vec3A; 4]], facing: impl Fn(Vec3A) -> Vec3A, material: &Arc<Material>) -> Model {
    let triangles = quads
        .iter()
        .flat_map(|corners| {
            let centroid = corners.iter().sum::<Vec3A>() / 4.0;
            quad(*corners, facing(centroid), None)
        })
        .collect();
    Model::new(triangles, vec![material.clone()], Some(material.clone()))
}

/// Quads of a box, oriented outwards.
fn closed_box(quads: &[[Vec3A; 4]], material: &Arc<Material>) -> Model {
    let center = quads.iter().flatten().sum::<Vec3A>() / (4 * quads.len()) as f32;
    mesh(quads, |centroid| centroid - center, material)
}

/// Emission of the Cornell box light.
pub const CORNELL_LIGHT: Color = Color::new(47.8348, 38.5664, 31.0808);

/// The six-mesh Cornell box and the camera in front of its open side.
pub fn cornell_box() -> (Scene, Camera) {
    // materials
    let red = Arc::new(Material::diffuse(Color::new(0.63, 0.065, 0.05)));
    let green = Arc::new(Material::diffuse(Color::new(0.14, 0.45, 0.091)));
    let white = Arc::new(Material::diffuse(Color::new(0.725, 0.71, 0.68)));
    let light = Arc::new(Material::emissive(Color::splat(0.65), CORNELL_LIGHT));

    let room_center = Vec3A::new(278.0, 274.4, 279.6);
    let inwards = |centroid: Vec3A| room_center - centroid;

    // floor, ceiling and back wall
    let floor = mesh(
        &[
            [
                Vec3A::new(552.8, 0.0, 0.0),
                Vec3A::new(0.0, 0.0, 0.0),
                Vec3A::new(0.0, 0.0, 559.2),
                Vec3A::new(549.6, 0.0, 559.2),
            ],
            [
                Vec3A::new(556.0, 548.8, 0.0),
                Vec3A::new(556.0, 548.8, 559.2),
                Vec3A::new(0.0, 548.8, 559.2),
                Vec3A::new(0.0, 548.8, 0.0),
            ],
            [
                Vec3A::new(549.6, 0.0, 559.2),
                Vec3A::new(0.0, 0.0, 559.2),
                Vec3A::new(0.0, 548.8, 559.2),
                Vec3A::new(556.0, 548.8, 559.2),
            ],
        ],
        inwards,
        &white,
    );

    let short_box = closed_box(
        &[
            [
                Vec3A::new(130.0, 165.0, 65.0),
                Vec3A::new(82.0, 165.0, 225.0),
                Vec3A::new(240.0, 165.0, 272.0),
                Vec3A::new(290.0, 165.0, 114.0),
            ],
            [
                Vec3A::new(290.0, 0.0, 114.0),
                Vec3A::new(290.0, 165.0, 114.0),
                Vec3A::new(240.0, 165.0, 272.0),
                Vec3A::new(240.0, 0.0, 272.0),
            ],
            [
                Vec3A::new(130.0, 0.0, 65.0),
                Vec3A::new(130.0, 165.0, 65.0),
                Vec3A::new(290.0, 165.0, 114.0),
                Vec3A::new(290.0, 0.0, 114.0),
            ],
            [
                Vec3A::new(82.0, 0.0, 225.0),
                Vec3A::new(82.0, 165.0, 225.0),
                Vec3A::new(130.0, 165.0, 65.0),
                Vec3A::new(130.0, 0.0, 65.0),
            ],
            [
                Vec3A::new(240.0, 0.0, 272.0),
                Vec3A::new(240.0, 165.0, 272.0),
                Vec3A::new(82.0, 165.0, 225.0),
                Vec3A::new(82.0, 0.0, 225.0),
            ],
        ],
        &white,
    );

    let tall_box = closed_box(
        &[
            [
                Vec3A::new(423.0, 330.0, 247.0),
                Vec3A::new(265.0, 330.0, 296.0),
                Vec3A::new(314.0, 330.0, 456.0),
                Vec3A::new(472.0, 330.0, 406.0),
            ],
            [
                Vec3A::new(423.0, 0.0, 247.0),
                Vec3A::new(423.0, 330.0, 247.0),
                Vec3A::new(472.0, 330.0, 406.0),
                Vec3A::new(472.0, 0.0, 406.0),
            ],
            [
                Vec3A::new(472.0, 0.0, 406.0),
                Vec3A::new(472.0, 330.0, 406.0),
                Vec3A::new(314.0, 330.0, 456.0),
                Vec3A::new(314.0, 0.0, 456.0),
            ],
            [
                Vec3A::new(314.0, 0.0, 456.0),
                Vec3A::new(314.0, 330.0, 456.0),
                Vec3A::new(265.0, 330.0, 296.0),
                Vec3A::new(265.0, 0.0, 296.0),
            ],
            [
                Vec3A::new(265.0, 0.0, 296.0),
                Vec3A::new(265.0, 330.0, 296.0),
                Vec3A::new(423.0, 330.0, 247.0),
                Vec3A::new(423.0, 0.0, 247.0),
            ],
        ],
        &white,
    );

    let left = mesh(
        &[[
            Vec3A::new(552.8, 0.0, 0.0),
            Vec3A::new(549.6, 0.0, 559.2),
            Vec3A::new(556.0, 548.8, 559.2),
            Vec3A::new(556.0, 548.8, 0.0),
        ]],
        inwards,
        &red,
    );

    let right = mesh(
        &[[
            Vec3A::new(0.0, 0.0, 559.2),
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(0.0, 548.8, 0.0),
            Vec3A::new(0.0, 548.8, 559.2),
        ]],
        inwards,
        &green,
    );

    // hangs just below the ceiling, facing down
    let light_mesh = mesh(
        &[[
            Vec3A::new(343.0, 548.7, 227.0),
            Vec3A::new(343.0, 548.7, 332.0),
            Vec3A::new(213.0, 548.7, 332.0),
            Vec3A::new(213.0, 548.7, 227.0),
        ]],
        |_| -Vec3A::Y,
        &light,
    );

    let mut scene = Scene::new();
    scene.add(floor);
    scene.add(short_box);
    scene.add(tall_box);
    scene.add(left);
    scene.add(right);
    scene.add(light_mesh);
    scene.add_light(Light::area(
        Vec3A::new(213.0, 548.7, 227.0),
        CORNELL_LIGHT,
        Vec3A::new(130.0, 0.0, 0.0),
        Vec3A::new(0.0, 0.0, 105.0),
    ));
    scene.build_bvh();

    (scene, Camera::default())
}

/// A few spheres on a floor in front of a wall, lit by a glowing sphere.
pub fn spheres() -> (Scene, Camera) {
    let white = Arc::new(Material::diffuse(Color::splat(0.73)));
    let red = Arc::new(Material::diffuse(Color::new(0.65, 0.05, 0.05)));
    let light = Arc::new(Material::emissive(Color::ONE, Color::splat(12.0)));

    let floor = mesh(
        &[
            [
                Vec3A::new(-6.0, 0.0, -6.0),
                Vec3A::new(6.0, 0.0, -6.0),
                Vec3A::new(6.0, 0.0, 6.0),
                Vec3A::new(-6.0, 0.0, 6.0),
            ],
            [
                Vec3A::new(-6.0, 0.0, 6.0),
                Vec3A::new(6.0, 0.0, 6.0),
                Vec3A::new(6.0, 6.0, 6.0),
                Vec3A::new(-6.0, 6.0, 6.0),
            ],
        ],
        |centroid| Vec3A::new(0.0, 1.0, 0.0) - centroid.normalize_or_zero(),
        &white,
    );

    let mut scene = Scene::new();
    scene.add(floor);
    scene.add(Sphere::new(Vec3A::new(0.0, 1.0, 1.0), 1.0, Some(white)));
    scene.add(Sphere::new(Vec3A::new(1.8, 0.6, 0.0), 0.6, Some(red)));
    scene.add(Sphere::new(Vec3A::new(-2.0, 3.0, 0.5), 0.5, Some(light.clone())));
    scene.add_light(Light::point(Vec3A::new(-2.0, 3.0, 0.5), light.emission));
    scene.build_bvh();

    (scene, Camera::new(Vec3A::new(0.0, 1.5, -7.0), 40.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hittables::Hittable, ray::Ray};

    #[test]
    fn quad_orientation() {
        let corners = [Vec3A::ZERO, Vec3A::X, Vec3A::X + Vec3A::Z, Vec3A::Z];
        for facing in [Vec3A::Y, -Vec3A::Y] {
            for tri in quad(corners, facing, None) {
                assert!((tri.face_normal() - facing).length() < 1e-6);
                assert!((tri.area() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn cornell_box_layout() {
        let (scene, camera) = cornell_box();
        assert_eq!(scene.primitives().len(), 6);
        assert_eq!(scene.lights().len(), 1);

        let emitters: Vec<_> = scene
            .primitives()
            .iter()
            .filter(|p| p.has_emission())
            .collect();
        assert_eq!(emitters.len(), 1);
        assert!((emitters[0].area() - 130.0 * 105.0).abs() < 1e-1);

        // straight ahead, left of the tall box, is the back wall
        let origin = camera.position - Vec3A::new(128.0, 0.0, 0.0);
        let hit = scene.intersect(&Ray::new(origin, Vec3A::Z, 0.0));
        assert!(hit.hit);
        assert!((hit.position.z - 559.2).abs() < 1e-2);
        assert!(hit.normal.z < 0.0);

        // the light is seen from below
        let up = Ray::new(Vec3A::new(278.0, 10.0, 280.0), Vec3A::Y, 0.0);
        let hit = scene.intersect(&up);
        assert!(hit.material.map_or(false, |m| m.has_emission()));
        assert!((hit.position.y - 548.7).abs() < 1e-2);
    }

    #[test]
    fn walls_face_the_room() {
        let (scene, _) = cornell_box();
        let center = Vec3A::new(278.0, 274.4, 279.6);
        for dir in [Vec3A::X, -Vec3A::X, -Vec3A::Y, Vec3A::Z] {
            let hit = scene.intersect(&Ray::new(center, dir, 0.0));
            assert!(hit.hit, "no wall along {dir}");
            assert!(hit.normal.dot(dir) < 0.0, "wall along {dir} faces away");
        }
    }

    #[test]
    fn sphere_scene_has_a_light() {
        let (scene, camera) = spheres();
        assert!(scene.primitives().iter().any(|p| p.has_emission()));
        let hit = scene.intersect(&Ray::new(camera.position, Vec3A::Z, 0.0));
        assert!(hit.hit);
    }
}
