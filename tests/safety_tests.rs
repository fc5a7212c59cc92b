use closuregraph::{
    ClosureCache, Node,
    bench_utils::{HierarchyShape, generate_hierarchy},
    safety::{
        run_safety_checks, run_strict_safety_checks, validate_closure, validate_components,
        validate_link_symmetry, validate_minimality,
    },
};

fn cache_from(shape: HierarchyShape, nodes: usize, seed: u64) -> ClosureCache {
    let data = generate_hierarchy(shape, nodes, seed);
    let mut cache = ClosureCache::new(Node::new("direct"), Node::new("closed")).unwrap();
    for (s, o) in data.pairs() {
        cache.add_relation(&s, &o).unwrap();
    }
    cache
}

#[test]
fn report_for_clean_cache_no_issues() {
    let cache = cache_from(HierarchyShape::Chain, 10, 0);
    let report = run_safety_checks(&cache);
    assert_eq!(report.total_nodes, 10);
    assert_eq!(report.total_links, 9);
    assert_eq!(report.asymmetric_links, 0);
    assert_eq!(report.redundant_links, 0);
    assert_eq!(report.closure_mismatches, 0);
    assert_eq!(report.alias_links, 0);
    assert!(!report.has_issues());
}

#[test]
fn individual_checks_pass_on_cyclic_workloads() {
    let cache = cache_from(HierarchyShape::RingChain { size: 4 }, 24, 0);
    assert!(!validate_link_symmetry(&cache).has_issues());
    assert!(!validate_minimality(&cache).has_issues());
    assert!(!validate_closure(&cache).has_issues());
    assert!(!validate_components(&cache).has_issues());
    assert_eq!(cache.stats().components, 6);
    assert_eq!(cache.stats().direct_links, 5);
}

#[test]
fn strict_mode_passes_on_random_dags() {
    for seed in 0..5 {
        let cache = cache_from(HierarchyShape::RandomDag { edges: 120 }, 40, seed);
        run_strict_safety_checks(&cache).expect("invariants");
    }
}

#[test]
fn strict_mode_passes_on_trees_and_rings() {
    let tree = cache_from(HierarchyShape::Tree { fanout: 3 }, 40, 0);
    run_strict_safety_checks(&tree).expect("tree");
    let ring = cache_from(HierarchyShape::Ring, 12, 0);
    run_strict_safety_checks(&ring).expect("ring");
    assert_eq!(ring.stats().leads, 1);
    assert_eq!(ring.stats().closed_pairs, 144);
}
