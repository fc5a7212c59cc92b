use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::{node::Triple, relation_node::NodeId, walker::WalkDirection};

#[derive(Default)]
pub struct WalkCache {
    inner: RwLock<AHashMap<(NodeId, WalkDirection), Arc<Vec<Triple>>>>,
}

impl WalkCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(AHashMap::new()),
        }
    }

    pub fn get(&self, node: NodeId, direction: WalkDirection) -> Option<Arc<Vec<Triple>>> {
        self.inner.read().get(&(node, direction)).cloned()
    }

    pub fn insert(
        &self,
        node: NodeId,
        direction: WalkDirection,
        walk: Vec<Triple>,
    ) -> Arc<Vec<Triple>> {
        let walk = Arc::new(walk);
        let mut inner = self.inner.write();
        inner.insert((node, direction), Arc::clone(&walk));
        walk
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        if !inner.is_empty() {
            inner.clear();
        }
    }
}
