use std::time::Duration;

use closuregraph::{
    CacheConfig, ClosureCache, Node, TriplePattern,
    bench_utils::{HierarchyShape, RelationDataset, generate_hierarchy},
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

const TREE_SEED: u64 = 0xDD21;
const DAG_SEED: u64 = 0xEE45;
const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

struct PreparedCache {
    dataset: RelationDataset,
    cache: ClosureCache,
    label: &'static str,
}

fn bench_scale() -> usize {
    #[cfg(feature = "bench-ci")]
    {
        1_000
    }
    #[cfg(not(feature = "bench-ci"))]
    {
        5_000
    }
}

fn prepared_caches(cache_walks: bool) -> Vec<PreparedCache> {
    let nodes = bench_scale();
    let tree = generate_hierarchy(HierarchyShape::Tree { fanout: 4 }, nodes, TREE_SEED);
    let dag = generate_hierarchy(
        HierarchyShape::RandomDag {
            edges: nodes.saturating_mul(2),
        },
        nodes,
        DAG_SEED,
    );
    vec![
        materialize(tree, "tree", cache_walks),
        materialize(dag, "dag", cache_walks),
    ]
}

fn materialize(dataset: RelationDataset, label: &'static str, cache_walks: bool) -> PreparedCache {
    let config = CacheConfig {
        cache_walks,
        ..CacheConfig::default()
    };
    let (direct, closed) = (Node::new("direct"), Node::new("closed"));
    let mut cache = ClosureCache::with_config(direct, closed, config).expect("cache");
    for (start, end) in dataset.pairs() {
        cache.add_relation(&start, &end).expect("insert");
    }
    PreparedCache {
        dataset,
        cache,
        label,
    }
}

fn bench_membership(c: &mut Criterion) {
    let caches = prepared_caches(false);
    let mut group = c.benchmark_group("membership");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for prepared in &caches {
        let last = prepared.dataset.node_count() - 1;
        let pattern = TriplePattern::new(
            Some(prepared.dataset.nodes[0].clone()),
            Some(Node::new("closed")),
            Some(prepared.dataset.nodes[last].clone()),
        );
        group.bench_function(BenchmarkId::from_parameter(prepared.label), |b| {
            b.iter(|| prepared.cache.contains(&pattern).expect("contains"));
        });
    }
    group.finish();
}

fn bench_walks(c: &mut Criterion, name: &str, cache_walks: bool) {
    let caches = prepared_caches(cache_walks);
    let mut group = c.benchmark_group(name);
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for prepared in &caches {
        let nodes = &prepared.dataset.nodes;
        let hub = nodes[prepared.dataset.hub_index()].clone();
        let leaf = nodes[prepared.dataset.node_count() - 1].clone();
        let forward = TriplePattern::new(Some(hub), Some(Node::new("closed")), None);
        let backward = TriplePattern::new(None, Some(Node::new("closed")), Some(leaf));
        group.bench_function(BenchmarkId::new("forward", prepared.label), |b| {
            b.iter(|| prepared.cache.find(&forward).expect("find").count());
        });
        group.bench_function(BenchmarkId::new("backward", prepared.label), |b| {
            b.iter(|| prepared.cache.find(&backward).expect("find").count());
        });
    }
    group.finish();
}

fn bench_fresh_walks(c: &mut Criterion) {
    bench_walks(c, "walks_fresh", false);
}

fn bench_memoized_walks(c: &mut Criterion) {
    bench_walks(c, "walks_memoized", true);
}

fn bench_full_enumeration(c: &mut Criterion) {
    let caches = prepared_caches(false);
    let mut group = c.benchmark_group("full_enumeration");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    let direct = TriplePattern::new(None, Some(Node::new("direct")), None);
    for prepared in &caches {
        group.bench_function(BenchmarkId::from_parameter(prepared.label), |b| {
            b.iter(|| prepared.cache.find(&direct).expect("find").count());
        });
    }
    group.finish();
}

criterion_group!(
    name = query_benches;
    config = Criterion::default();
    targets = bench_membership, bench_fresh_walks, bench_memoized_walks, bench_full_enumeration
);
criterion_main!(query_benches);
