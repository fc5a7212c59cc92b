use ahash::AHashSet;
use serde::Serialize;
use tracing::debug;

use crate::{
    closure::ClosureCache,
    errors::ClosureGraphError,
    finder::Finder,
    node::{Node, TriplePattern},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub relations: usize,
    pub sub_relations: usize,
    pub facts_found: bool,
}

pub struct BulkCacheBuilder<'a> {
    source: &'a dyn Finder,
}

impl<'a> BulkCacheBuilder<'a> {
    pub fn new(source: &'a dyn Finder) -> Self {
        Self { source }
    }

    pub fn seed(
        &self,
        cache: &mut ClosureCache,
        relation: &Node,
    ) -> Result<bool, ClosureGraphError> {
        cache.cache_all(self.source, relation)
    }

    /// Seeds a self-describing relation such as a sub-property hierarchy. Any
    /// predicate the cache places below its own closed predicate is pulled as
    /// well, until no new one appears.
    pub fn seed_self_describing(
        &self,
        cache: &mut ClosureCache,
    ) -> Result<SeedReport, ClosureGraphError> {
        let root = cache.closed_predicate().clone();
        let mut report = SeedReport::default();
        let mut seen: AHashSet<Node> = AHashSet::new();
        let mut pending = vec![root.clone()];
        while !pending.is_empty() {
            for relation in pending.drain(..) {
                if !seen.insert(relation.clone()) {
                    continue;
                }
                report.relations += 1;
                if relation != root {
                    report.sub_relations += 1;
                }
                report.facts_found |= cache.cache_all(self.source, &relation)?;
            }
            let below = TriplePattern::new(None, Some(root.clone()), Some(root.clone()));
            pending = cache
                .find(&below)?
                .map(|triple| triple.subject)
                .filter(|subject| !seen.contains(subject))
                .collect();
        }
        debug!(
            relation = %root,
            relations = report.relations,
            "seeded self-describing relation"
        );
        Ok(report)
    }

    pub fn seed_governed(
        &self,
        target: &mut ClosureCache,
        governing: &ClosureCache,
    ) -> Result<SeedReport, ClosureGraphError> {
        let root = target.closed_predicate().clone();
        let below = TriplePattern::new(
            None,
            Some(governing.closed_predicate().clone()),
            Some(root.clone()),
        );
        let mut relations: Vec<Node> = vec![root.clone()];
        relations.extend(
            governing
                .find(&below)?
                .map(|triple| triple.subject)
                .filter(|subject| *subject != root),
        );
        let mut report = SeedReport::default();
        for relation in &relations {
            report.relations += 1;
            if *relation != root {
                report.sub_relations += 1;
            }
            report.facts_found |= target.cache_all(self.source, relation)?;
        }
        debug!(
            relation = %root,
            relations = report.relations,
            "seeded governed relation"
        );
        Ok(report)
    }
}
