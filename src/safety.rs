use std::fmt;

use serde::Serialize;

use crate::{closure::ClosureCache, relation_node::links_to};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SafetyReport {
    pub total_nodes: usize,
    pub total_links: usize,
    pub asymmetric_links: usize,
    pub redundant_links: usize,
    pub closure_mismatches: usize,
    pub alias_links: usize,
}

impl SafetyReport {
    pub fn merge(&mut self, other: &SafetyReport) {
        self.total_nodes = self.total_nodes.max(other.total_nodes);
        self.total_links = self.total_links.max(other.total_links);
        self.asymmetric_links += other.asymmetric_links;
        self.redundant_links += other.redundant_links;
        self.closure_mismatches += other.closure_mismatches;
        self.alias_links += other.alias_links;
    }

    pub fn has_issues(&self) -> bool {
        self.asymmetric_links > 0
            || self.redundant_links > 0
            || self.closure_mismatches > 0
            || self.alias_links > 0
    }
}

#[derive(Debug)]
pub struct SafetyError {
    pub report: SafetyReport,
}

impl fmt::Display for SafetyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "closure invariants violated")
    }
}

impl std::error::Error for SafetyError {}

pub fn validate_link_symmetry(cache: &ClosureCache) -> SafetyReport {
    let mut report = base_report(cache);
    let nodes = cache.nodes();
    for id in cache.registered_ids() {
        let node = &nodes[id.index()];
        report.asymmetric_links += node
            .successors
            .iter()
            .filter(|succ| !nodes[succ.index()].predecessors.contains(&id))
            .count();
        report.asymmetric_links += node
            .predecessors
            .iter()
            .filter(|pred| !nodes[pred.index()].successors.contains(&id))
            .count();
    }
    report
}

pub fn validate_minimality(cache: &ClosureCache) -> SafetyReport {
    let mut report = base_report(cache);
    for id in cache.registered_ids() {
        let successors = cache.nodes()[id.index()].successor_ids();
        for &succ in &successors {
            if succ == id || cache.implied_by_sibling(&successors, succ) {
                report.redundant_links += 1;
            }
        }
    }
    report
}

// Compares the stored closure of every lead with a fresh search over links.
pub fn validate_closure(cache: &ClosureCache) -> SafetyReport {
    let mut report = base_report(cache);
    let nodes = cache.nodes();
    for id in cache.registered_ids() {
        if !cache.components().is_lead(id) {
            continue;
        }
        for target in cache.registered_ids() {
            let expected = links_to(nodes, id, cache.lead(target));
            if expected != nodes[id.index()].path_to(target) {
                report.closure_mismatches += 1;
            }
        }
    }
    report
}

pub fn validate_components(cache: &ClosureCache) -> SafetyReport {
    let mut report = base_report(cache);
    let components = cache.components();
    for id in cache.registered_ids() {
        let node = &cache.nodes()[id.index()];
        if components.is_lead(id) {
            report.alias_links += node
                .successors
                .iter()
                .chain(node.predecessors.iter())
                .filter(|&&other| !components.is_lead(other))
                .count();
        } else {
            report.alias_links += node.successors.len() + node.predecessors.len();
        }
    }
    report
}

pub fn run_safety_checks(cache: &ClosureCache) -> SafetyReport {
    let mut report = SafetyReport::default();
    report.merge(&validate_link_symmetry(cache));
    report.merge(&validate_minimality(cache));
    report.merge(&validate_closure(cache));
    report.merge(&validate_components(cache));
    report
}

pub fn run_strict_safety_checks(cache: &ClosureCache) -> Result<(), SafetyError> {
    let report = run_safety_checks(cache);
    if report.has_issues() {
        Err(SafetyError { report })
    } else {
        Ok(())
    }
}

fn base_report(cache: &ClosureCache) -> SafetyReport {
    SafetyReport {
        total_nodes: cache.len(),
        total_links: cache.nodes().iter().map(|n| n.successors.len()).sum(),
        ..SafetyReport::default()
    }
}
