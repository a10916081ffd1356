//! Generation and layout benchmarks.
//!
//! Run with: cargo bench --bench generation_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tspgen::config::GenerationOptions;
use tspgen::graph::GraphGenerator;
use tspgen::layout::{ForceDirectedLayout, SpringLayout};
use tspgen::record::GraphRecord;
use tspgen::rng::GraphRng;

fn options(nodes: usize, symmetrical: bool) -> GenerationOptions {
    GenerationOptions {
        nodes,
        symmetrical,
        seed: Some(42),
        ..GenerationOptions::default()
    }
}

/// Skeleton pairing plus weight assignment.
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.sample_size(50);

    for n in [10, 50, 100] {
        for symmetrical in [false, true] {
            let label = if symmetrical { "sym" } else { "asym" };
            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, &n| {
                let opts = options(n, symmetrical);
                let generator = GraphGenerator::new();
                b.iter(|| {
                    let mut rng = GraphRng::new(42);
                    black_box(generator.generate(&opts, &mut rng))
                });
            });
        }
    }

    group.finish();
}

/// Fruchterman-Reingold placement on complete graphs.
fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("spring_layout");
    group.sample_size(20);

    for n in [10, 50, 100] {
        let mut rng = GraphRng::new(7);
        let Ok(graph) = GraphGenerator::new().generate(&options(n, false), &mut rng) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &graph, |b, graph| {
            let layout = SpringLayout::default();
            b.iter(|| {
                let mut rng = GraphRng::new(7);
                black_box(layout.layout(graph, &mut rng))
            });
        });
    }

    group.finish();
}

/// Record serialization of a placed graph.
fn bench_record(c: &mut Criterion) {
    let mut rng = GraphRng::new(3);
    let Ok(mut graph) = GraphGenerator::new().generate(&options(50, true), &mut rng) else {
        return;
    };
    let Ok(positions) = SpringLayout::default().layout(&graph, &mut rng) else {
        return;
    };
    if graph.place_all(&positions).is_err() {
        return;
    }
    let Ok(record) = GraphRecord::from_graph(&graph) else {
        return;
    };

    c.bench_function("record_to_json_50", |b| b.iter(|| black_box(record.to_json())));
}

criterion_group!(benches, bench_generate, bench_layout, bench_record);
criterion_main!(benches);
