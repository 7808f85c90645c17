use core::fmt::Debug;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::OnceLock;

use smallvec::SmallVec;

use crate::stats::{fisher, ContingencyTable};
use crate::term::{Term, TermId};
use crate::variant::AlleleCounts;
use crate::DEFAULT_NUM_PARENTS;

mod builder;
mod group;
mod termarena;
pub use builder::DagBuilder;
pub use group::NodeGroup;
use termarena::Arena;

/// Stable handle of an [`EnrichmentNode`] inside an [`EnrichmentDag`]
///
/// Handles are assigned in resolution order, so iterating handles from
/// `0..len` visits every node after all of its parents.
#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId {
    inner: u32,
}

impl NodeId {
    /// Returns the handle as index into the arena
    pub fn as_usize(&self) -> usize {
        self.inner as usize
    }
}

impl From<u32> for NodeId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.inner)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.inner)
    }
}

/// Parent handles of a node
pub type Parents = SmallVec<[NodeId; DEFAULT_NUM_PARENTS]>;

/// A resolved ontology term together with its accumulated allele counts
///
/// Every [`Term`] of the ontology has exactly one `EnrichmentNode` that lives
/// as long as the [`EnrichmentDag`]. The counts only ever grow during a scan.
/// The Fisher p-value is computed on first access and cached until
/// the counts change again.
#[derive(Debug)]
pub struct EnrichmentNode {
    term: Term,
    parents: Parents,
    counts: AlleleCounts,
    pvalue: OnceLock<f64>,
}

impl EnrichmentNode {
    pub(crate) fn new(term: Term, parents: Parents) -> Self {
        Self {
            term,
            parents,
            counts: AlleleCounts::default(),
            pvalue: OnceLock::new(),
        }
    }

    /// The ontology term of the node
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Shortcut for the identifier of the term
    pub fn id(&self) -> &TermId {
        self.term.id()
    }

    /// Shortcut for the display name of the term
    pub fn name(&self) -> &str {
        self.term.name()
    }

    /// Direct parents of the node
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// The accumulated counts of all variants that reached the node
    pub fn counts(&self) -> &AlleleCounts {
        &self.counts
    }

    /// The two-tailed Fisher's exact test p-value of the accumulated counts
    ///
    /// The value is calculated once and then cached.
    pub fn pvalue(&self) -> f64 {
        *self
            .pvalue
            .get_or_init(|| fisher::two_tailed(&ContingencyTable::from(self.counts)))
    }

    /// Adds `counts` to the accumulators and invalidates the cached p-value
    pub(crate) fn accumulate(&mut self, counts: &AlleleCounts) {
        self.counts += *counts;
        self.pvalue.take();
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// The resolved ontology with one [`EnrichmentNode`] per term
///
/// All nodes are owned by the DAG and addressed via [`NodeId`] handles.
/// Parent links are stored as handles as well, so the DAG never contains
/// references between nodes.
///
/// The DAG is constructed with [`DagBuilder::build`].
///
/// ```mermaid
/// erDiagram
///     DAG ||--|{ NODE : owns
///     NODE }o--o{ NODE : parents
///     NODE ||--|| TERM : wraps
///     GENE }|--|{ NODE : annotated_to
///     NODE {
///         NodeId handle
///         Parents parents
///         AlleleCounts counts
///         OnceLock pvalue
///     }
///     TERM {
///         TermId id
///         str name
///         Vec synonyms
///     }
/// ```
///
/// # Examples
///
/// ```
/// use goburden::{DagBuilder, Term};
/// use goburden::term::RelationKind;
///
/// let mut child = Term::new("GO:2", "child");
/// child.add_relation("GO:1", RelationKind::IsA);
/// let mut root = Term::new("GO:1", "root");
/// root.add_synonym("top");
///
/// let dag = DagBuilder::build(vec![child, root]).unwrap();
/// assert_eq!(dag.len(), 2);
///
/// let child = dag.node_id(&"GO:2".into()).unwrap();
/// let root = dag.node_id(&"GO:1".into()).unwrap();
/// assert_eq!(dag.get(child).unwrap().parents(), &[root]);
///
/// assert_eq!(dag.term_by_name("top").unwrap().name(), "root");
/// ```
#[derive(Default)]
pub struct EnrichmentDag {
    nodes: Arena,
    names: HashMap<String, TermId>,
}

impl Debug for EnrichmentDag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EnrichmentDag with {} nodes", self.nodes.len())
    }
}

impl EnrichmentDag {
    pub(crate) fn new(nodes: Arena, names: HashMap<String, TermId>) -> Self {
        Self { nodes, names }
    }

    /// Returns the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the DAG does not contain any node
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the node of the handle, if present
    pub fn get(&self, id: NodeId) -> Option<&EnrichmentNode> {
        self.nodes.get(id)
    }

    /// Returns the handle of the node that wraps the term `term_id`
    pub fn node_id(&self, term_id: &TermId) -> Option<NodeId> {
        self.nodes.node_id(term_id)
    }

    /// Returns the term with the identifier, display name or synonym `name`
    ///
    /// Identifiers take precedence over display names, display names over
    /// synonyms.
    pub fn term_by_name(&self, name: &str) -> Option<&Term> {
        let id = self.term_id_by_name(name)?;
        self.node_id(&id)
            .and_then(|id| self.get(id))
            .map(EnrichmentNode::term)
    }

    /// Returns the identifier of the term with the identifier, display name
    /// or synonym `name`
    ///
    /// Unlike [`EnrichmentDag::term_by_name`] this does not require a node
    /// for the term to exist.
    pub(crate) fn term_id_by_name(&self, name: &str) -> Option<TermId> {
        let id = TermId::from(name);
        if self.nodes.contains(&id) {
            return Some(id);
        }
        self.names.get(name).cloned()
    }

    /// Iterates all nodes in DAG order, i.e. parents before children
    pub fn nodes(&self) -> std::slice::Iter<'_, EnrichmentNode> {
        self.nodes.iter()
    }

    /// Iterates all node handles in DAG order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|idx| NodeId::from(idx as u32))
    }

    /// Returns all direct and indirect parents of the node
    ///
    /// The node itself is not part of the result.
    pub fn ancestors(&self, id: NodeId) -> NodeGroup {
        let mut res = NodeGroup::default();
        let mut stack: Vec<NodeId> = match self.get(id) {
            Some(node) => node.parents().to_vec(),
            None => return res,
        };
        while let Some(current) = stack.pop() {
            if res.insert(current) {
                if let Some(node) = self.get(current) {
                    stack.extend_from_slice(node.parents());
                }
            }
        }
        res
    }

    #[cfg(test)]
    pub(crate) fn insert_name(&mut self, name: &str, id: TermId) {
        self.names.insert(name.to_string(), id);
    }

    /// Returns a mutable reference to the node of the handle
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut EnrichmentNode> {
        self.nodes.get_mut(id)
    }
}

impl<'a> IntoIterator for &'a EnrichmentDag {
    type Item = &'a EnrichmentNode;
    type IntoIter = std::slice::Iter<'a, EnrichmentNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes()
    }
}
