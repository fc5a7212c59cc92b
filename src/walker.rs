use std::collections::{btree_set, hash_set};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    closure::ClosureCache,
    node::{Node, Triple},
    relation_node::NodeId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalkDirection {
    Forward,
    Backward,
}

/// Depth-first walk over direct links. Every reached lead is expanded to all
/// keys of its component, and the start's own siblings follow the reflexive
/// pair.
pub struct GraphWalker<'a> {
    cache: &'a ClosureCache,
    direction: WalkDirection,
    deep: bool,
    root: Node,
    predicate: Node,
    reflexive: bool,
    pending: Vec<NodeId>,
    stack: Vec<btree_set::Iter<'a, NodeId>>,
    visited: AHashSet<NodeId>,
}

impl<'a> GraphWalker<'a> {
    pub(crate) fn new(
        cache: &'a ClosureCache,
        start: NodeId,
        direction: WalkDirection,
        deep: bool,
        predicate: Node,
    ) -> Self {
        let lead = cache.lead(start);
        let mut pending: Vec<NodeId> = cache
            .components()
            .members(lead)
            .filter(|&member| member != start)
            .collect();
        pending.reverse();
        let mut visited = AHashSet::new();
        visited.insert(lead);
        Self {
            cache,
            direction,
            deep,
            root: cache.key(start).clone(),
            predicate,
            reflexive: true,
            pending,
            stack: vec![links(cache, lead, direction)],
            visited,
        }
    }

    fn emit(&self, other: NodeId) -> Triple {
        let other = self.cache.key(other).clone();
        let predicate = self.predicate.clone();
        match self.direction {
            WalkDirection::Forward => Triple::new(self.root.clone(), predicate, other),
            WalkDirection::Backward => Triple::new(other, predicate, self.root.clone()),
        }
    }

    fn reflexive_pair(&self) -> Triple {
        Triple::new(self.root.clone(), self.predicate.clone(), self.root.clone())
    }
}

impl Iterator for GraphWalker<'_> {
    type Item = Triple;

    fn next(&mut self) -> Option<Triple> {
        if self.reflexive {
            self.reflexive = false;
            return Some(self.reflexive_pair());
        }
        let cache = self.cache;
        loop {
            if let Some(id) = self.pending.pop() {
                return Some(self.emit(id));
            }
            let frame = self.stack.last_mut()?;
            match frame.next() {
                Some(&next) => {
                    // Junctions are reachable along several paths.
                    if !self.visited.insert(next) {
                        continue;
                    }
                    if self.deep {
                        self.stack.push(links(cache, next, self.direction));
                    }
                    self.pending.extend(cache.components().members(next));
                    self.pending.reverse();
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

fn links(
    cache: &ClosureCache,
    lead: NodeId,
    direction: WalkDirection,
) -> btree_set::Iter<'_, NodeId> {
    let node = &cache.nodes()[lead.index()];
    match direction {
        WalkDirection::Forward => node.successors.iter(),
        WalkDirection::Backward => node.predecessors.iter(),
    }
}

pub struct ClosedWalker<'a> {
    cache: &'a ClosureCache,
    root: Node,
    root_id: NodeId,
    predicate: Node,
    reflexive: bool,
    inner: hash_set::Iter<'a, NodeId>,
}

impl<'a> ClosedWalker<'a> {
    pub(crate) fn new(cache: &'a ClosureCache, start: NodeId, predicate: Node) -> Self {
        let lead = cache.lead(start);
        Self {
            cache,
            root: cache.key(start).clone(),
            root_id: start,
            predicate,
            reflexive: true,
            inner: cache.nodes()[lead.index()].closed.iter(),
        }
    }

    fn reflexive_pair(&self) -> Triple {
        Triple::new(self.root.clone(), self.predicate.clone(), self.root.clone())
    }
}

impl Iterator for ClosedWalker<'_> {
    type Item = Triple;

    fn next(&mut self) -> Option<Triple> {
        if self.reflexive {
            self.reflexive = false;
            return Some(self.reflexive_pair());
        }
        let root_id = self.root_id;
        let next = self.inner.by_ref().find(|&&id| id != root_id)?;
        Some(Triple::new(
            self.root.clone(),
            self.predicate.clone(),
            self.cache.key(*next).clone(),
        ))
    }
}

enum NodeWalk<'a> {
    Closed(ClosedWalker<'a>),
    Direct(GraphWalker<'a>),
}

impl Iterator for NodeWalk<'_> {
    type Item = Triple;

    fn next(&mut self) -> Option<Triple> {
        match self {
            NodeWalk::Closed(walk) => walk.next(),
            NodeWalk::Direct(walk) => walk.next(),
        }
    }
}

pub struct FullGraphWalker<'a> {
    cache: &'a ClosureCache,
    closed: bool,
    predicate: Node,
    ids: Box<dyn Iterator<Item = NodeId> + 'a>,
    current: Option<NodeWalk<'a>>,
}

impl<'a> FullGraphWalker<'a> {
    pub(crate) fn new(cache: &'a ClosureCache, closed: bool, predicate: Node) -> Self {
        Self {
            cache,
            closed,
            predicate,
            ids: Box::new(cache.registered_ids()),
            current: None,
        }
    }
}

impl Iterator for FullGraphWalker<'_> {
    type Item = Triple;

    fn next(&mut self) -> Option<Triple> {
        loop {
            if let Some(triple) = self.current.as_mut().and_then(|walk| walk.next()) {
                return Some(triple);
            }
            let id = self.ids.next()?;
            let predicate = self.predicate.clone();
            self.current = Some(if self.closed {
                NodeWalk::Closed(ClosedWalker::new(self.cache, id, predicate))
            } else {
                NodeWalk::Direct(GraphWalker::new(
                    self.cache,
                    id,
                    WalkDirection::Forward,
                    false,
                    predicate,
                ))
            });
        }
    }
}
