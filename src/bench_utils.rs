use ahash::AHashSet;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::node::Node;

#[derive(Clone, Debug)]
pub struct RelationDataset {
    pub nodes: Vec<Node>,
    pub edges: Vec<(usize, usize)>,
}

impl RelationDataset {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (Node, Node)> + '_ {
        self.edges
            .iter()
            .map(|&(from, to)| (self.nodes[from].clone(), self.nodes[to].clone()))
    }

    pub fn shuffled(&self, seed: u64) -> RelationDataset {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut edges = self.edges.clone();
        edges.shuffle(&mut rng);
        RelationDataset {
            nodes: self.nodes.clone(),
            edges,
        }
    }

    /// The node with the most outgoing edges; the root of a tree.
    pub fn hub_index(&self) -> usize {
        let mut counts = vec![0usize; self.nodes.len()];
        for &(from, _) in &self.edges {
            counts[from] += 1;
        }
        let mut best = (0usize, 0usize);
        for (idx, deg) in counts.into_iter().enumerate() {
            if deg > best.0 {
                best = (deg, idx);
            }
        }
        best.1
    }
}

#[derive(Clone, Debug)]
pub enum HierarchyShape {
    Chain,
    Tree { fanout: usize },
    /// Edges only run from lower to higher index, so no cycles.
    RandomDag { edges: usize },
    /// A chain closed back onto its first node; one SCC.
    Ring,
    /// Rings of `size` nodes, each ring pointing at the next.
    RingChain { size: usize },
}

pub fn generate_hierarchy(shape: HierarchyShape, node_count: usize, seed: u64) -> RelationDataset {
    assert!(node_count > 1, "node_count must exceed 1");
    let nodes = (0..node_count)
        .map(|idx| Node::new(format!("n{idx}")))
        .collect();
    let edges = match shape {
        HierarchyShape::Chain => chain_edges(node_count),
        HierarchyShape::Tree { fanout } => tree_edges(node_count, fanout),
        HierarchyShape::RandomDag { edges } => random_dag_edges(node_count, edges, seed),
        HierarchyShape::Ring => {
            let mut edges = chain_edges(node_count);
            edges.push((node_count - 1, 0));
            edges
        }
        HierarchyShape::RingChain { size } => ring_chain_edges(node_count, size),
    };
    RelationDataset { nodes, edges }
}

fn chain_edges(count: usize) -> Vec<(usize, usize)> {
    (0..count - 1).map(|idx| (idx, idx + 1)).collect()
}

fn tree_edges(count: usize, fanout: usize) -> Vec<(usize, usize)> {
    assert!(fanout > 0, "fanout must be positive");
    (1..count).map(|child| ((child - 1) / fanout, child)).collect()
}

fn random_dag_edges(count: usize, edge_count: usize, seed: u64) -> Vec<(usize, usize)> {
    assert!(
        edge_count <= count * (count - 1) / 2,
        "edge_count exceeds possible pairs"
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = AHashSet::with_capacity(edge_count);
    let mut edges = Vec::with_capacity(edge_count);
    while edges.len() < edge_count {
        let a = rng.gen_range(0..count);
        let b = rng.gen_range(0..count);
        if a == b {
            continue;
        }
        let pair = (a.min(b), a.max(b));
        if seen.insert(pair) {
            edges.push(pair);
        }
    }
    edges.sort_unstable();
    edges
}

fn ring_chain_edges(count: usize, size: usize) -> Vec<(usize, usize)> {
    assert!(size > 1, "ring size must exceed 1");
    let mut edges = Vec::new();
    for start in (0..count).step_by(size) {
        let end = (start + size).min(count);
        for idx in start..end - 1 {
            edges.push((idx, idx + 1));
        }
        if end - start > 1 {
            edges.push((end - 1, start));
        }
        if end < count {
            edges.push((end - 1, end));
        }
    }
    edges
}
