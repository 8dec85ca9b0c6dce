use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3A;
use penumbra::{
    bvh::BvhAccel,
    camera::Camera,
    hittables::Triangle,
    scenes,
};
use rand::{Rng, SeedableRng};

/// Random triangles scattered through a cube.
fn triangle_soup(n: usize) -> Vec<Triangle> {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(0);
    (0..n)
        .map(|_| {
            let base = (rng.gen::<Vec3A>() - 0.5) * 100.0;
            let v1 = base + (rng.gen::<Vec3A>() - 0.5) * 4.0;
            let v2 = base + (rng.gen::<Vec3A>() - 0.5) * 4.0;
            Triangle::new(base, v1, v2, None)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    // configuration of criterion
    let mut bench_group = c.benchmark_group("bvh_build");
    // filter noise more noise
    bench_group.noise_threshold(0.05);
    // smaller sig level to combat noise
    bench_group.significance_level(0.1);

    for n in [1_000, 10_000] {
        let soup = triangle_soup(n);
        // use bench with input for cleaner per-size test name
        bench_group.bench_with_input(BenchmarkId::from_parameter(n), &soup, |b, s| {
            // no need for iter_batched since we don't modify the input
            b.iter(|| BvhAccel::new(s))
        });
    }

    bench_group.finish();
}

fn bench_intersect(c: &mut Criterion) {
    let mut bench_group = c.benchmark_group("bvh_intersect");
    bench_group.noise_threshold(0.05);
    bench_group.significance_level(0.1);

    let soup = triangle_soup(10_000);
    let bvh = BvhAccel::new(&soup);
    let camera = Camera::new(Vec3A::new(0.0, 0.0, -200.0), 40.0);
    bench_group.bench_function("soup", |b| {
        b.iter(|| {
            (0..64)
                .flat_map(|j| (0..64).map(move |i| (i, j)))
                .filter(|&(i, j)| bvh.intersect(&soup, &camera.get_ray(i, j, 64, 64)).hit)
                .count()
        })
    });

    // modify scene selection here
    for scene_type in [scenes::SceneType::CornellBox, scenes::SceneType::Spheres] {
        let (scene, camera) = scenes::get_scene(scene_type);
        bench_group.bench_with_input(
            BenchmarkId::from_parameter(format!("{scene_type:?}")),
            &scene,
            |b, s| {
                b.iter(|| {
                    (0..48)
                        .flat_map(|j| (0..48).map(move |i| (i, j)))
                        .filter(|&(i, j)| s.intersect(&camera.get_ray(i, j, 48, 48)).hit)
                        .count()
                })
            },
        );
    }

    bench_group.finish();
}

criterion_group! {benches, bench_build, bench_intersect}
criterion_main!(benches);
