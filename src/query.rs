use std::sync::Arc;

use crate::{
    closure::ClosureCache,
    errors::ClosureGraphError,
    finder::{Finder, TripleIter},
    node::{Node, Triple, TriplePattern, validate_node, validate_pattern},
    relation_node::NodeId,
    walker::{ClosedWalker, FullGraphWalker, GraphWalker, WalkDirection},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Semantics {
    Direct,
    Closed,
}

impl ClosureCache {
    /// The direct predicate selects the minimal relation, while the closed
    /// predicate or a wildcard selects the reflexive-transitive closure.
    pub fn find(&self, pattern: &TriplePattern) -> Result<TripleIter<'_>, ClosureGraphError> {
        validate_pattern(pattern)?;
        let Some(semantics) = self.semantics(pattern.predicate.as_ref()) else {
            return Ok(empty());
        };
        let predicate = match semantics {
            Semantics::Direct => self.direct_predicate().clone(),
            Semantics::Closed => self.closed_predicate().clone(),
        };
        let closed = semantics == Semantics::Closed;
        match (&pattern.subject, &pattern.object) {
            (None, None) => Ok(Box::new(FullGraphWalker::new(self, closed, predicate))),
            (Some(subject), None) => {
                let Some(start) = self.node_id(subject) else {
                    return Ok(empty());
                };
                if closed {
                    Ok(self.closed_walk(start, WalkDirection::Forward, predicate))
                } else {
                    Ok(Box::new(GraphWalker::new(
                        self,
                        start,
                        WalkDirection::Forward,
                        false,
                        predicate,
                    )))
                }
            }
            (None, Some(object)) => {
                let Some(start) = self.node_id(object) else {
                    return Ok(empty());
                };
                if closed {
                    Ok(self.closed_walk(start, WalkDirection::Backward, predicate))
                } else {
                    Ok(Box::new(GraphWalker::new(
                        self,
                        start,
                        WalkDirection::Backward,
                        false,
                        predicate,
                    )))
                }
            }
            (Some(subject), Some(object)) => {
                let (Some(s), Some(o)) = (self.node_id(subject), self.node_id(object)) else {
                    return Ok(empty());
                };
                if self.related(s, o, semantics) {
                    let triple = Triple::new(subject.clone(), predicate, object.clone());
                    Ok(Box::new(std::iter::once(triple)))
                } else {
                    Ok(empty())
                }
            }
        }
    }

    pub fn contains(&self, pattern: &TriplePattern) -> Result<bool, ClosureGraphError> {
        Ok(self.find(pattern)?.next().is_some())
    }

    pub fn find_with_continuation<'a>(
        &'a self,
        pattern: &TriplePattern,
        fallback: &'a dyn Finder,
    ) -> Result<TripleIter<'a>, ClosureGraphError> {
        match &pattern.predicate {
            None => {
                let cached = self.find(pattern)?;
                let rest = fallback.find(pattern)?;
                Ok(Box::new(cached.chain(rest)))
            }
            Some(predicate) if self.owns(predicate) => self.find(pattern),
            Some(_) => fallback.find(pattern),
        }
    }

    pub fn list_all_subjects(&self) -> impl Iterator<Item = &Node> + '_ {
        self.registered_ids().map(move |id| self.key(id))
    }

    pub fn is_subject(&self, node: &Node) -> Result<bool, ClosureGraphError> {
        validate_node(node, "subject")?;
        Ok(self.node_id(node).is_some())
    }

    fn owns(&self, predicate: &Node) -> bool {
        predicate == self.direct_predicate() || predicate == self.closed_predicate()
    }

    fn semantics(&self, predicate: Option<&Node>) -> Option<Semantics> {
        match predicate {
            None => Some(Semantics::Closed),
            Some(p) if p == self.closed_predicate() => Some(Semantics::Closed),
            Some(p) if p == self.direct_predicate() => Some(Semantics::Direct),
            Some(_) => None,
        }
    }

    fn related(&self, subject: NodeId, object: NodeId, semantics: Semantics) -> bool {
        let lead_s = self.lead(subject);
        let lead_o = self.lead(object);
        let node = &self.nodes()[lead_s.index()];
        match semantics {
            Semantics::Closed => node.path_to(object),
            Semantics::Direct => lead_s == lead_o || node.direct_link_to(lead_o),
        }
    }

    fn closed_walk(
        &self,
        start: NodeId,
        direction: WalkDirection,
        predicate: Node,
    ) -> TripleIter<'_> {
        if !self.config().cache_walks {
            return self.fresh_closed_walk(start, direction, predicate);
        }
        let walk = match self.walks().get(start, direction) {
            Some(walk) => walk,
            None => {
                let fresh = self.fresh_closed_walk(start, direction, predicate);
                self.walks().insert(start, direction, fresh.collect())
            }
        };
        Box::new(replay(walk))
    }

    fn fresh_closed_walk(
        &self,
        start: NodeId,
        direction: WalkDirection,
        predicate: Node,
    ) -> TripleIter<'_> {
        match direction {
            WalkDirection::Forward => Box::new(ClosedWalker::new(self, start, predicate)),
            WalkDirection::Backward => Box::new(GraphWalker::new(
                self,
                start,
                WalkDirection::Backward,
                true,
                predicate,
            )),
        }
    }
}

impl Finder for ClosureCache {
    fn find(&self, pattern: &TriplePattern) -> Result<TripleIter<'_>, ClosureGraphError> {
        ClosureCache::find(self, pattern)
    }
}

fn empty<'a>() -> TripleIter<'a> {
    Box::new(std::iter::empty())
}

fn replay(walk: Arc<Vec<Triple>>) -> impl Iterator<Item = Triple> {
    (0..walk.len()).map(move |idx| walk[idx].clone())
}
