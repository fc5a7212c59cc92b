use std::{collections::BTreeSet, fmt};

use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use tracing::debug;

use crate::{
    cache::WalkCache,
    components::{AliasState, Components},
    config::CacheConfig,
    errors::ClosureGraphError,
    finder::Finder,
    node::{Node, Triple, TriplePattern, validate_node},
    relation_node::{NodeId, RelationNode, link, unlink},
};

pub struct ClosureCache {
    direct_predicate: Node,
    closed_predicate: Node,
    config: CacheConfig,
    nodes: Vec<RelationNode>,
    index: AHashMap<Node, NodeId>,
    components: Components,
    facts: AHashSet<(Node, Node)>,
    walks: WalkCache,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub nodes: usize,
    pub leads: usize,
    pub components: usize,
    pub direct_links: usize,
    pub closed_pairs: usize,
    pub retained_facts: usize,
    pub memoized_walks: usize,
}

#[derive(Clone, Debug, Serialize)]
struct NodeDescription<'a> {
    key: &'a Node,
    alias: AliasState,
    direct: Vec<&'a Node>,
    closed: usize,
}

impl ClosureCache {
    pub fn new(direct_predicate: Node, closed_predicate: Node) -> Result<Self, ClosureGraphError> {
        Self::with_config(direct_predicate, closed_predicate, CacheConfig::default())
    }

    pub fn with_config(
        direct_predicate: Node,
        closed_predicate: Node,
        config: CacheConfig,
    ) -> Result<Self, ClosureGraphError> {
        validate_node(&direct_predicate, "direct predicate")?;
        validate_node(&closed_predicate, "closed predicate")?;
        if direct_predicate == closed_predicate {
            return Err(ClosureGraphError::invalid_argument(
                "direct and closed predicates must differ",
            ));
        }
        Ok(Self {
            direct_predicate,
            closed_predicate,
            config,
            nodes: Vec::new(),
            index: AHashMap::new(),
            components: Components::default(),
            facts: AHashSet::new(),
            walks: WalkCache::new(),
        })
    }

    pub fn direct_predicate(&self) -> &Node {
        &self.direct_predicate
    }

    pub fn closed_predicate(&self) -> &Node {
        &self.closed_predicate
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_relation(&mut self, start: &Node, end: &Node) -> Result<(), ClosureGraphError> {
        validate_node(start, "start")?;
        validate_node(end, "end")?;
        if self.config.retain_facts {
            self.facts.insert((start.clone(), end.clone()));
        }
        self.insert_link(start, end);
        Ok(())
    }

    pub fn add_relation_triple(&mut self, triple: &Triple) -> Result<(), ClosureGraphError> {
        self.add_relation(&triple.subject, &triple.object)
    }

    pub fn remove_relation(&mut self, start: &Node, end: &Node) -> Result<(), ClosureGraphError> {
        self.remove_relations([(start.clone(), end.clone())])
    }

    pub fn remove_relation_triple(&mut self, triple: &Triple) -> Result<(), ClosureGraphError> {
        self.remove_relation(&triple.subject, &triple.object)
    }

    /// Pairs that are only implied by other links just drop out of the retained
    /// facts. Pairs backed by a direct link, or lying inside one SCC, force a
    /// rebuild of every node that can reach the start of the link.
    pub fn remove_relations<I>(&mut self, pairs: I) -> Result<(), ClosureGraphError>
    where
        I: IntoIterator<Item = (Node, Node)>,
    {
        let pairs: Vec<(Node, Node)> = pairs.into_iter().collect();
        for (start, end) in &pairs {
            validate_node(start, "start")?;
            validate_node(end, "end")?;
        }
        let mut kernel = Vec::new();
        for (start, end) in &pairs {
            if start == end {
                continue;
            }
            let (Some(&s), Some(&e)) = (self.index.get(start), self.index.get(end)) else {
                continue;
            };
            let (lead_s, lead_e) = (self.components.find(s), self.components.find(e));
            if lead_s == lead_e || self.nodes[lead_s.index()].direct_link_to(lead_e) {
                kernel.push(lead_s);
            }
        }
        if !kernel.is_empty() && !self.config.retain_facts {
            return Err(ClosureGraphError::unsupported(
                "removing a direct or cyclic link requires retained facts",
            ));
        }
        for pair in &pairs {
            self.facts.remove(pair);
        }
        if !kernel.is_empty() {
            self.rebuild_region(&kernel);
        }
        Ok(())
    }

    pub fn cache_all(
        &mut self,
        source: &dyn Finder,
        relation: &Node,
    ) -> Result<bool, ClosureGraphError> {
        validate_node(relation, "relation")?;
        let pattern = TriplePattern::new(None, Some(relation.clone()), None);
        let facts: Vec<Triple> = source.find(&pattern)?.collect();
        for fact in &facts {
            self.add_relation_triple(fact)?;
        }
        debug!(relation = %relation, facts = facts.len(), "cached relation facts");
        Ok(!facts.is_empty())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.components.clear();
        self.facts.clear();
        self.walks.clear();
    }

    pub fn deep_copy(&self) -> Self {
        let mut copy = Self {
            direct_predicate: self.direct_predicate.clone(),
            closed_predicate: self.closed_predicate.clone(),
            config: self.config.clone(),
            nodes: Vec::with_capacity(self.nodes.len()),
            index: AHashMap::with_capacity(self.index.len()),
            components: Components::default(),
            facts: self.facts.clone(),
            walks: WalkCache::new(),
        };
        for triple in self.direct_triples() {
            copy.insert_link(&triple.subject, &triple.object);
        }
        copy
    }

    pub fn set_caching(&mut self, enable: bool) {
        if !enable {
            self.walks.clear();
        }
        self.config.cache_walks = enable;
    }

    pub fn alias_state(&self, key: &Node) -> Option<AliasState> {
        let id = *self.index.get(key)?;
        let lead = self.components.find(id);
        let state = if lead != id {
            AliasState::AliasOf(self.key(lead).clone())
        } else if self.components.aliases(lead).is_empty() {
            AliasState::Singleton
        } else {
            AliasState::Lead(
                self.components
                    .aliases(lead)
                    .iter()
                    .map(|&alias| self.key(alias).clone())
                    .collect(),
            )
        };
        Some(state)
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            nodes: self.nodes.len(),
            retained_facts: self.facts.len(),
            memoized_walks: self.walks.len(),
            ..CacheStats::default()
        };
        for (idx, node) in self.nodes.iter().enumerate() {
            let id = NodeId::from_index(idx);
            stats.closed_pairs += self.nodes[self.components.find(id).index()].closed.len();
            if !self.components.is_lead(id) {
                continue;
            }
            stats.leads += 1;
            stats.direct_links += node.successors.len();
            if !self.components.aliases(id).is_empty() {
                stats.components += 1;
            }
        }
        stats
    }

    pub fn dump(&self) -> Result<String, ClosureGraphError> {
        let mut described = Vec::with_capacity(self.nodes.len());
        for (idx, node) in self.nodes.iter().enumerate() {
            let lead = &self.nodes[self.lead(NodeId::from_index(idx)).index()];
            let alias = self.alias_state(&node.key);
            described.push(NodeDescription {
                key: &node.key,
                alias: alias.unwrap_or(AliasState::Singleton),
                direct: lead.successors.iter().map(|&id| self.key(id)).collect(),
                closed: lead.closed.len(),
            });
        }
        to_json(&described)
    }
}

impl ClosureCache {
    pub(crate) fn nodes(&self) -> &[RelationNode] {
        &self.nodes
    }

    pub(crate) fn components(&self) -> &Components {
        &self.components
    }

    pub(crate) fn walks(&self) -> &WalkCache {
        &self.walks
    }

    pub(crate) fn node_id(&self, key: &Node) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub(crate) fn lead(&self, id: NodeId) -> NodeId {
        self.components.find(id)
    }

    pub(crate) fn key(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()].key
    }

    pub(crate) fn registered_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    fn resolve(&mut self, key: &Node) -> NodeId {
        if let Some(&id) = self.index.get(key) {
            return self.components.find(id);
        }
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(RelationNode::new(id, key.clone()));
        self.components.push(id);
        self.index.insert(key.clone(), id);
        id
    }

    fn insert_link(&mut self, start: &Node, end: &Node) {
        self.walks.clear();
        let start_id = self.resolve(start);
        let end_id = self.resolve(end);
        if start_id == end_id || self.nodes[start_id.index()].path_to(end_id) {
            return;
        }
        if self.nodes[end_id.index()].path_to(start_id) {
            self.collapse_cycle(start_id, end_id);
        } else {
            self.propagate_add(start_id, end_id);
            link(&mut self.nodes, start_id, end_id);
        }
    }

    fn propagate_add(&mut self, start: NodeId, end: NodeId) {
        let end_closed = self.nodes[end.index()].closed_ids();
        let mut visited = AHashSet::new();
        let mut stack = vec![start];
        visited.insert(start);
        while let Some(current) = stack.pop() {
            if current != start && self.nodes[current.index()].path_to(end) {
                // Its own predecessors already reach `end` through it.
                if self.nodes[current.index()].direct_link_to(end) {
                    unlink(&mut self.nodes, current, end);
                }
                continue;
            }
            let subsumed: Vec<NodeId> = self.nodes[current.index()]
                .successors
                .iter()
                .copied()
                .filter(|&succ| self.nodes[end.index()].path_to(succ))
                .collect();
            for succ in subsumed {
                unlink(&mut self.nodes, current, succ);
            }
            let node = &mut self.nodes[current.index()];
            node.closed.extend(end_closed.iter().copied());
            for &pred in &self.nodes[current.index()].predecessors {
                if visited.insert(pred) {
                    stack.push(pred);
                }
            }
        }
    }

    // `end` already reaches `start`, so every node on the cycle folds into `start`.
    fn collapse_cycle(&mut self, start: NodeId, end: NodeId) {
        let mut members = vec![start];
        let mut visited = AHashSet::new();
        let mut stack = vec![start];
        visited.insert(start);
        while let Some(current) = stack.pop() {
            for &pred in &self.nodes[current.index()].predecessors {
                if visited.insert(pred) && self.nodes[end.index()].path_to(pred) {
                    members.push(pred);
                    stack.push(pred);
                }
            }
        }
        debug_assert!(members.contains(&end), "cycle must pass through its end");
        debug!(
            lead = %self.key(start),
            members = members.len(),
            "collapsing strongly connected component"
        );
        self.make_lead_for(start, &members);
        self.propagate_merged(start);
    }

    fn make_lead_for(&mut self, lead: NodeId, members: &[NodeId]) {
        let inside: AHashSet<NodeId> = members.iter().copied().collect();
        let mut successors = BTreeSet::new();
        let mut predecessors = BTreeSet::new();
        let mut closed = AHashSet::new();
        for &member in members {
            let node = &self.nodes[member.index()];
            successors.extend(node.successors.iter().filter(|s| !inside.contains(*s)));
            predecessors.extend(node.predecessors.iter().filter(|p| !inside.contains(*p)));
            closed.extend(node.closed.iter().copied());
        }
        for &member in members {
            for succ in self.nodes[member.index()].successor_ids() {
                unlink(&mut self.nodes, member, succ);
            }
            for pred in self.nodes[member.index()].predecessor_ids() {
                unlink(&mut self.nodes, pred, member);
            }
            if member != lead {
                self.nodes[member.index()].reset(member);
            }
        }
        for succ in successors {
            link(&mut self.nodes, lead, succ);
        }
        for pred in predecessors {
            link(&mut self.nodes, pred, lead);
        }
        self.nodes[lead.index()].closed = closed;
        self.components.merge_into(lead, members);
        self.reduce_successors(lead);
    }

    // Every visited node reaches the lead through one of its successors, so any
    // other successor inside the lead's closure is now redundant.
    fn propagate_merged(&mut self, lead: NodeId) {
        let lead_closed = self.nodes[lead.index()].closed_ids();
        let mut visited = AHashSet::new();
        visited.insert(lead);
        let mut stack = self.nodes[lead.index()].predecessor_ids();
        visited.extend(stack.iter().copied());
        while let Some(current) = stack.pop() {
            let subsumed: Vec<NodeId> = self.nodes[current.index()]
                .successors
                .iter()
                .copied()
                .filter(|&succ| succ != lead && self.nodes[lead.index()].path_to(succ))
                .collect();
            for succ in subsumed {
                unlink(&mut self.nodes, current, succ);
            }
            let node = &mut self.nodes[current.index()];
            node.closed.extend(lead_closed.iter().copied());
            self.reduce_successors(current);
            for &pred in &self.nodes[current.index()].predecessors {
                if visited.insert(pred) {
                    stack.push(pred);
                }
            }
        }
    }

    fn reduce_successors(&mut self, id: NodeId) {
        let successors = self.nodes[id.index()].successor_ids();
        let redundant: Vec<NodeId> = successors
            .iter()
            .copied()
            .filter(|&candidate| self.implied_by_sibling(&successors, candidate))
            .collect();
        for succ in redundant {
            unlink(&mut self.nodes, id, succ);
        }
    }

    pub(crate) fn implied_by_sibling(&self, siblings: &[NodeId], target: NodeId) -> bool {
        siblings
            .iter()
            .any(|&other| other != target && self.nodes[other.index()].path_to(target))
    }

    fn rebuild_region(&mut self, kernel: &[NodeId]) {
        self.walks.clear();
        let mut affected_leads: AHashSet<NodeId> = kernel.iter().copied().collect();
        let mut stack: Vec<NodeId> = kernel.to_vec();
        while let Some(current) = stack.pop() {
            for &pred in &self.nodes[current.index()].predecessors {
                if affected_leads.insert(pred) {
                    stack.push(pred);
                }
            }
        }
        // Predecessors of affected leads are affected too, so clearing the
        // outgoing links detaches the whole region.
        for &lead in &affected_leads {
            for succ in self.nodes[lead.index()].successor_ids() {
                unlink(&mut self.nodes, lead, succ);
            }
        }
        let mut reset: AHashSet<NodeId> = AHashSet::with_capacity(affected_leads.len());
        for &lead in &affected_leads {
            reset.insert(lead);
            reset.extend(self.components.split(lead));
        }
        for &id in &reset {
            self.nodes[id.index()].reset(id);
        }
        let mut replay: Vec<(Node, Node)> = self
            .facts
            .iter()
            .filter(|(start, _)| self.node_id(start).is_some_and(|id| reset.contains(&id)))
            .cloned()
            .collect();
        replay.sort();
        debug!(
            reset = reset.len(),
            replayed = replay.len(),
            "rebuilding closure region after removal"
        );
        for (start, end) in replay {
            self.insert_link(&start, &end);
        }
    }

    fn direct_triples(&self) -> Vec<Triple> {
        let mut triples = Vec::new();
        for id in self.registered_ids() {
            let lead = self.lead(id);
            let subject = self.key(id);
            let targets = self
                .components
                .members(lead)
                .chain(self.nodes[lead.index()].successors.iter().copied());
            for target in targets {
                triples.push(Triple::new(
                    subject.clone(),
                    self.direct_predicate.clone(),
                    self.key(target).clone(),
                ));
            }
        }
        triples
    }
}

impl fmt::Debug for ClosureCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureCache")
            .field("direct_predicate", &self.direct_predicate)
            .field("closed_predicate", &self.closed_predicate)
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn to_json<T: Serialize>(described: &T) -> Result<String, ClosureGraphError> {
    serde_json::to_string_pretty(described)
        .map_err(|e| ClosureGraphError::serialization(e.to_string()))
}
