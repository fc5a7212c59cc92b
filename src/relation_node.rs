use std::collections::BTreeSet;

use ahash::AHashSet;
use serde::Serialize;

use crate::node::Node;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn from_index(idx: usize) -> Self {
        match u32::try_from(idx) {
            Ok(raw) => NodeId(raw),
            Err(_) => panic!("invariant violated: node index {idx} exceeds the handle range"),
        }
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

// Only leads carry live links. Aliases keep their key and slot but are inert.
#[derive(Clone, Debug)]
pub(crate) struct RelationNode {
    pub(crate) key: Node,
    pub(crate) successors: BTreeSet<NodeId>,
    pub(crate) predecessors: BTreeSet<NodeId>,
    // Every id, lead or alias, in the reflexive-transitive closure.
    pub(crate) closed: AHashSet<NodeId>,
}

impl RelationNode {
    pub(crate) fn new(id: NodeId, key: Node) -> Self {
        let mut closed = AHashSet::with_capacity(1);
        closed.insert(id);
        Self {
            key,
            successors: BTreeSet::new(),
            predecessors: BTreeSet::new(),
            closed,
        }
    }

    pub(crate) fn path_to(&self, target: NodeId) -> bool {
        self.closed.contains(&target)
    }

    pub(crate) fn direct_link_to(&self, target: NodeId) -> bool {
        self.successors.contains(&target)
    }

    pub(crate) fn successor_ids(&self) -> Vec<NodeId> {
        self.successors.iter().copied().collect()
    }

    pub(crate) fn predecessor_ids(&self) -> Vec<NodeId> {
        self.predecessors.iter().copied().collect()
    }

    pub(crate) fn closed_ids(&self) -> Vec<NodeId> {
        self.closed.iter().copied().collect()
    }

    pub(crate) fn reset(&mut self, id: NodeId) {
        self.successors.clear();
        self.predecessors.clear();
        self.closed.clear();
        self.closed.insert(id);
    }
}

/// Adds `from -> to` in both directions. Every link write goes through here or
/// [`unlink`].
pub(crate) fn link(nodes: &mut [RelationNode], from: NodeId, to: NodeId) {
    debug_assert_ne!(from, to, "reflexive links are implicit");
    nodes[from.index()].successors.insert(to);
    nodes[to.index()].predecessors.insert(from);
    tracing::trace!(from = %nodes[from.index()].key, to = %nodes[to.index()].key, "link");
}

pub(crate) fn unlink(nodes: &mut [RelationNode], from: NodeId, to: NodeId) {
    nodes[from.index()].successors.remove(&to);
    nodes[to.index()].predecessors.remove(&from);
    tracing::trace!(from = %nodes[from.index()].key, to = %nodes[to.index()].key, "unlink");
}

pub(crate) fn links_to(nodes: &[RelationNode], from: NodeId, target: NodeId) -> bool {
    if from == target {
        return true;
    }
    let mut visited = AHashSet::new();
    let mut stack = vec![from];
    visited.insert(from);
    while let Some(current) = stack.pop() {
        for &next in &nodes[current.index()].successors {
            if next == target {
                return true;
            }
            if visited.insert(next) {
                stack.push(next);
            }
        }
    }
    false
}
