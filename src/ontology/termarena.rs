use std::collections::HashMap;

use crate::ontology::{EnrichmentNode, NodeId};
use crate::TermId;

/// Owns all [`EnrichmentNode`]s, indexed by insertion order
pub(crate) struct Arena {
    nodes: Vec<EnrichmentNode>,
    ids: HashMap<TermId, NodeId>,
}

impl Arena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ids: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Appends the node and returns its handle
    pub fn insert(&mut self, node: EnrichmentNode) -> NodeId {
        let id = NodeId::from(self.nodes.len() as u32);
        self.ids.insert(node.id().clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&EnrichmentNode> {
        self.nodes.get(id.as_usize())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut EnrichmentNode> {
        self.nodes.get_mut(id.as_usize())
    }

    pub fn node_id(&self, term_id: &TermId) -> Option<NodeId> {
        self.ids.get(term_id).copied()
    }

    pub fn contains(&self, term_id: &TermId) -> bool {
        self.ids.contains_key(term_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichmentNode> {
        self.nodes.iter()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::with_capacity(crate::DEFAULT_NUM_TERMS)
    }
}
