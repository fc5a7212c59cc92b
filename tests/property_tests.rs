use std::collections::{BTreeSet, VecDeque};

use closuregraph::{
    ClosureCache, Node, TriplePattern,
    bench_utils::{HierarchyShape, RelationDataset, generate_hierarchy},
    run_strict_safety_checks,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

type Pairs = BTreeSet<(String, String)>;

fn build(data: &RelationDataset) -> ClosureCache {
    let mut cache = ClosureCache::new(Node::new("direct"), Node::new("closed")).unwrap();
    for (s, o) in data.pairs() {
        cache.add_relation(&s, &o).unwrap();
    }
    cache
}

fn all_pairs(cache: &ClosureCache, predicate: &str) -> Pairs {
    let pattern = TriplePattern::new(None, Some(predicate.into()), None);
    cache
        .find(&pattern)
        .unwrap()
        .map(|t| (t.subject.to_string(), t.object.to_string()))
        .collect()
}

// Reflexive-transitive closure by breadth-first search from every node.
fn reference_closure(data: &RelationDataset) -> Pairs {
    let mut adjacency = vec![Vec::new(); data.node_count()];
    let mut touched = vec![false; data.node_count()];
    for &(from, to) in &data.edges {
        adjacency[from].push(to);
        touched[from] = true;
        touched[to] = true;
    }
    let mut pairs = Pairs::new();
    for start in (0..data.node_count()).filter(|&idx| touched[idx]) {
        let mut seen = vec![false; data.node_count()];
        let mut queue = VecDeque::from([start]);
        seen[start] = true;
        while let Some(current) = queue.pop_front() {
            pairs.insert((
                data.nodes[start].to_string(),
                data.nodes[current].to_string(),
            ));
            for &next in &adjacency[current] {
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    pairs
}

// A random DAG with a few back edges, so some SCCs form.
fn cyclic_dataset(seed: u64) -> RelationDataset {
    let mut data = generate_hierarchy(HierarchyShape::RandomDag { edges: 60 }, 30, seed);
    let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
    for _ in 0..4 {
        let a = rng.gen_range(0..30);
        let b = rng.gen_range(0..30);
        if a != b {
            data.edges.push((a.max(b), a.min(b)));
        }
    }
    data
}

#[test]
fn test_closure_matches_reference_search() {
    for seed in 0..8 {
        let data = cyclic_dataset(seed);
        let cache = build(&data);
        assert_eq!(
            all_pairs(&cache, "closed"),
            reference_closure(&data),
            "seed {seed}"
        );
        run_strict_safety_checks(&cache).expect("invariants");
    }
}

#[test]
fn test_insertion_order_does_not_matter() {
    for seed in 0..8 {
        let data = cyclic_dataset(seed);
        let baseline = build(&data);
        let direct = all_pairs(&baseline, "direct");
        let closed = all_pairs(&baseline, "closed");
        for shuffle in 1..4 {
            let reordered = build(&data.shuffled(seed * 31 + shuffle));
            let label = format!("seed {seed}/{shuffle}");
            assert_eq!(all_pairs(&reordered, "direct"), direct, "{label}");
            assert_eq!(all_pairs(&reordered, "closed"), closed, "{label}");
        }
    }
}

#[test]
fn test_direct_pairs_are_minimal() {
    let data = generate_hierarchy(HierarchyShape::RandomDag { edges: 150 }, 40, 11);
    let cache = build(&data);
    let closed = all_pairs(&cache, "closed");
    let direct: Pairs = all_pairs(&cache, "direct")
        .into_iter()
        .filter(|(s, o)| s != o)
        .collect();
    for (s, o) in &direct {
        let bypass = direct.iter().any(|(s2, mid)| {
            s2 == s && mid != o && closed.contains(&(mid.clone(), o.clone()))
        });
        assert!(!bypass, "{s} -> {o} is implied");
    }
}

#[test]
fn test_removal_matches_rebuilt_cache() {
    for seed in 0..6 {
        let data = cyclic_dataset(seed);
        let mut cache = build(&data);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut remaining = data.clone();
        for _ in 0..5 {
            if remaining.edges.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..remaining.edges.len());
            let (from, to) = remaining.edges.remove(idx);
            // Duplicate pairs are one fact.
            remaining.edges.retain(|&edge| edge != (from, to));
            let (start, end) = (&remaining.nodes[from], &remaining.nodes[to]);
            cache.remove_relation(start, end).unwrap();
        }
        let fresh = build(&remaining);
        let reference = reference_closure(&remaining);
        let closed: Pairs = all_pairs(&cache, "closed")
            .into_iter()
            .filter(|(s, o)| s != o || reference.contains(&(s.clone(), o.clone())))
            .collect();
        assert_eq!(closed, reference, "seed {seed}");
        assert_eq!(
            all_pairs(&fresh, "closed"),
            reference,
            "seed {seed} fresh build"
        );
        run_strict_safety_checks(&cache).expect("invariants");
    }
}
