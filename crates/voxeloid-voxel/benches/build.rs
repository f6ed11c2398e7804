use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use voxeloid_voxel::{linearize, OctreeBuilder, OctreeConfig};

fn wavy(p: Vec3) -> bool {
    (p.x * 6.0).sin() * (p.z * 5.0).cos() * 0.4 > p.y
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_build");
    for depth in [4_u8, 5, 6] {
        let builder = OctreeBuilder::new(OctreeConfig::with_max_depth(depth), wavy)
            .expect("valid depth");
        group.bench_with_input(BenchmarkId::from_parameter(depth), &builder, |b, builder| {
            b.iter(|| black_box(builder.build()));
        });
    }
    group.finish();
}

fn bench_linearize(c: &mut Criterion) {
    let tree = OctreeBuilder::new(OctreeConfig::with_max_depth(6), wavy)
        .expect("valid depth")
        .build();
    c.bench_function("linearize_depth_6", |b| {
        b.iter(|| black_box(linearize(&tree).expect("grid fits")));
    });
}

criterion_group!(benches, bench_build, bench_linearize);
criterion_main!(benches);
