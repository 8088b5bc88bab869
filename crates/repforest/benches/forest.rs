use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use repforest::Graph;

const SIZES: [u32; 3] = [1_000, 10_000, 100_000];

fn chain(n: u32) -> Graph<u32> {
    (0..n).map(|i| (i, i + 1)).collect()
}

/// One big cycle: every node has a predecessor, so there is no source.
fn ring(n: u32) -> Graph<u32> {
    (0..n).map(|i| (i, (i + 1) % n)).collect()
}

/// Binary out-tree; no node is reachable along two paths.
fn tree(n: u32) -> Graph<u32> {
    (1..n).map(|i| ((i - 1) / 2, i)).collect()
}

fn bench_tarjan(c: &mut Criterion) {
    let mut group = c.benchmark_group("tarjan");

    for n in SIZES {
        group.throughput(Throughput::Elements(u64::from(n)));
        for (shape, build) in [("chain", chain as fn(u32) -> Graph<u32>), ("ring", ring)] {
            let mut graph = build(n);
            group.bench_with_input(BenchmarkId::new(shape, n), &n, |b, _| {
                b.iter(|| black_box(graph.tarjan().len()));
            });
        }
    }

    group.finish();
}

fn bench_forest(c: &mut Criterion) {
    let mut group = c.benchmark_group("representative_forest");

    for n in SIZES {
        group.throughput(Throughput::Elements(u64::from(n)));
        for (shape, build) in [
            ("chain", chain as fn(u32) -> Graph<u32>),
            ("ring", ring),
            ("tree", tree),
        ] {
            let mut graph = build(n);
            group.bench_with_input(BenchmarkId::new(shape, n), &n, |b, _| {
                b.iter(|| {
                    let mut emitted = 0_usize;
                    graph
                        .to_representative_forest(|_| {}, |_| emitted += 1)
                        .expect("unbounded run");
                    black_box(emitted)
                });
            });
        }
    }

    group.finish();
}

/// Layered graph whose forest doubles with every layer.
fn bench_replication(c: &mut Criterion) {
    let mut group = c.benchmark_group("replication");

    for layers in [8_u32, 12, 16] {
        let mut graph = Graph::new();
        for layer in 0..layers {
            for from in [2 * layer, 2 * layer + 1] {
                graph.add_edge(from, 2 * layer + 2);
                graph.add_edge(from, 2 * layer + 3);
            }
        }
        group.bench_with_input(BenchmarkId::from_parameter(layers), &layers, |b, _| {
            b.iter(|| {
                let summary = graph
                    .to_representative_forest(|_| {}, |_| {})
                    .expect("unbounded run");
                black_box(summary.tree_nodes)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tarjan, bench_forest, bench_replication);
criterion_main!(benches);
