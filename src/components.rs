use serde::Serialize;

use crate::{node::Node, relation_node::NodeId};

#[derive(Clone, Debug, Default)]
pub(crate) struct Components {
    // Members point straight at their lead, so `find` is one lookup.
    parent: Vec<NodeId>,
    aliases: Vec<Vec<NodeId>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AliasState {
    Singleton,
    AliasOf(Node),
    Lead(Vec<Node>),
}

impl Components {
    pub(crate) fn push(&mut self, id: NodeId) {
        debug_assert_eq!(id.index(), self.parent.len());
        self.parent.push(id);
        self.aliases.push(Vec::new());
    }

    pub(crate) fn find(&self, id: NodeId) -> NodeId {
        match self.parent.get(id.index()) {
            Some(&lead) => lead,
            None => panic!("invariant violated: node handle {id:?} is not registered"),
        }
    }

    pub(crate) fn is_lead(&self, id: NodeId) -> bool {
        self.find(id) == id
    }

    pub(crate) fn aliases(&self, lead: NodeId) -> &[NodeId] {
        &self.aliases[lead.index()]
    }

    pub(crate) fn members(&self, lead: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(lead).chain(self.aliases(lead).iter().copied())
    }

    pub(crate) fn merge_into(&mut self, lead: NodeId, absorbed: &[NodeId]) {
        let mut gathered = std::mem::take(&mut self.aliases[lead.index()]);
        for &other in absorbed {
            if other == lead {
                continue;
            }
            debug_assert!(self.is_lead(other), "only leads can be absorbed");
            gathered.push(other);
            gathered.append(&mut self.aliases[other.index()]);
        }
        for &member in &gathered {
            self.parent[member.index()] = lead;
        }
        gathered.sort_unstable();
        gathered.dedup();
        self.aliases[lead.index()] = gathered;
    }

    pub(crate) fn split(&mut self, lead: NodeId) -> Vec<NodeId> {
        let aliases = std::mem::take(&mut self.aliases[lead.index()]);
        for &member in &aliases {
            self.parent[member.index()] = member;
        }
        aliases
    }

    pub(crate) fn clear(&mut self) {
        self.parent.clear();
        self.aliases.clear();
    }
}
