use pprof::criterion::{Output, PProfProfiler};

use bevy_math::uvec2;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use orienteer_path::{
    find_path, AlgorithmTag, CancellationToken, CostModel, ElevationSampler, Grid, Heuristic,
    PathOptions,
};

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathfinding");
    group.sample_size(50);

    let size = 512;
    let grid = Grid::new_open(size, size);
    let elevation = ElevationSampler::flat(1.0);
    let model = CostModel::new(&grid, &elevation);
    let start = uvec2(0, 0);
    let end = uvec2(size - 1, size - 1);
    let cancel = CancellationToken::new();

    for (name, algorithm) in [
        ("a_star_euclidean", AlgorithmTag::AStar),
        ("dijkstra", AlgorithmTag::Dijkstra),
        ("theta_star", AlgorithmTag::ThetaStar),
        ("lazy_theta_star", AlgorithmTag::LazyThetaStar),
    ] {
        let options = PathOptions::new(algorithm, Heuristic::Euclidean);
        group.bench_function(name, |b| {
            b.iter(|| {
                let result = find_path(
                    black_box(&grid),
                    black_box(&model),
                    black_box(start),
                    black_box(end),
                    black_box(&options),
                    black_box(&cancel),
                )
                .unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = criterion_benchmark
}
criterion_main!(benches);
