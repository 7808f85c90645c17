use smallvec::SmallVec;

use crate::ontology::NodeId;
use crate::DEFAULT_NUM_GENE_TERMS;

/// A sorted set of [`NodeId`]s
///
/// Each node can occur only once in the group. The group is used for the
/// nodes a gene is annotated to and for the nodes hit by a single variant.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    ids: SmallVec<[NodeId; DEFAULT_NUM_GENE_TERMS]>,
}

impl NodeGroup {
    /// Constructs a new, empty [`NodeGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the group contains no [`NodeId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`NodeId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`NodeId`] to the group
    ///
    /// Returns whether the `NodeId` was newly inserted. That is:
    ///
    /// - If the group did not previously contain this `NodeId`, true is returned.
    /// - If the group already contained this `NodeId`, false is returned.
    pub fn insert(&mut self, id: NodeId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Returns `true` if the group contains the [`NodeId`]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`NodeId`]s inside the group
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, NodeId>> {
        self.ids.iter().copied()
    }

    /// Removes all [`NodeId`]s, keeping the allocation
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl FromIterator<NodeId> for NodeGroup {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        let mut group = NodeGroup::new();
        group.extend(iter);
        group
    }
}

impl Extend<NodeId> for NodeGroup {
    fn extend<T: IntoIterator<Item = NodeId>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a NodeGroup {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
