//! Mapping of gene symbols to the [`EnrichmentNode`]s they are annotated to
//!
//! [`EnrichmentNode`]: crate::EnrichmentNode
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::ontology::{EnrichmentDag, NodeGroup};
use crate::{BurdenError, BurdenResult};

/// Maps gene symbols to the nodes of their directly annotated terms
///
/// The index only stores [`crate::NodeId`] handles, so it can be built once
/// and shared read-only while the DAG accumulates counts.
///
/// # Examples
///
/// ```
/// use goburden::{DagBuilder, GeneIndex, Term};
///
/// let mut term = Term::new("GO:0006281", "DNA repair");
/// term.add_synonym("DNA repair process");
/// let dag = DagBuilder::build(vec![term]).unwrap();
///
/// let mut genes = GeneIndex::default();
/// assert!(genes.add_association(&dag, "BRCA1", "GO:0006281").unwrap());
/// // the same node again, via the synonym
/// assert!(!genes.add_association(&dag, "BRCA1", "DNA repair process").unwrap());
/// // unknown terms are skipped
/// assert!(!genes.add_association(&dag, "BRCA1", "GO:9999999").unwrap());
///
/// assert_eq!(genes.nodes_for("BRCA1").unwrap().len(), 1);
/// assert!(genes.nodes_for("TP53").is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct GeneIndex {
    genes: HashMap<String, NodeGroup>,
}

impl GeneIndex {
    /// Annotates `gene` to the term with the identifier, display name or synonym `term`
    ///
    /// Returns `true` if the association is new. Associations to terms that
    /// are unknown to the ontology (e.g. obsolete terms) are logged and
    /// skipped, returning `false`.
    ///
    /// # Errors
    ///
    /// [`BurdenError::MissingNode`] if the term is known but has no node in
    /// the DAG. This cannot happen for a DAG from [`crate::DagBuilder`].
    pub fn add_association(
        &mut self,
        dag: &EnrichmentDag,
        gene: &str,
        term: &str,
    ) -> BurdenResult<bool> {
        let Some(term_id) = dag.term_id_by_name(term) else {
            warn!(
                "Unknown term {} for gene {}. Could be obsolete or renamed. Skipping.",
                term, gene
            );
            return Ok(false);
        };
        let node = dag
            .node_id(&term_id)
            .ok_or_else(|| BurdenError::MissingNode(term_id.to_string()))?;

        let inserted = self.genes.entry(gene.to_string()).or_default().insert(node);
        if inserted {
            debug!("Linked {} to {}", gene, term_id);
        }
        Ok(inserted)
    }

    /// Returns the nodes `gene` is directly annotated to
    pub fn nodes_for(&self, gene: &str) -> Option<&NodeGroup> {
        self.genes.get(gene)
    }

    /// Returns `true` if `gene` is annotated to at least one node
    pub fn contains(&self, gene: &str) -> bool {
        self.genes.contains_key(gene)
    }

    /// Collects the nodes of all `genes` into `nodes`
    ///
    /// Unknown genes are ignored. Returns `true` if at least one node was added.
    pub fn collect_nodes<I, S>(&self, genes: I, nodes: &mut NodeGroup) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut found = false;
        for gene in genes {
            if let Some(group) = self.nodes_for(gene.as_ref()) {
                nodes.extend(group);
                found = true;
            }
        }
        found
    }

    /// Number of genes with at least one annotation
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if no gene is annotated
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::RelationKind;
    use crate::{DagBuilder, Term};

    fn small_dag() -> EnrichmentDag {
        let root = Term::new("GO:1", "root");
        let mut child = Term::new("GO:2", "child");
        child.add_synonym("the child");
        child.add_relation("GO:1", RelationKind::IsA);
        DagBuilder::build(vec![child, root]).unwrap()
    }

    #[test]
    fn associations_by_id_name_and_synonym() {
        let dag = small_dag();
        let mut genes = GeneIndex::default();

        assert!(genes.add_association(&dag, "G1", "GO:2").unwrap());
        assert!(genes.add_association(&dag, "G1", "root").unwrap());
        assert!(!genes.add_association(&dag, "G1", "the child").unwrap());
        assert_eq!(genes.nodes_for("G1").unwrap().len(), 2);
        assert_eq!(genes.len(), 1);
    }

    #[test]
    fn unknown_term_is_soft() {
        let dag = small_dag();
        let mut genes = GeneIndex::default();
        assert!(!genes.add_association(&dag, "G1", "GO:0000000").unwrap());
        assert!(genes.is_empty());
        assert!(!genes.contains("G1"));
    }

    #[test]
    fn collect_nodes_of_several_genes() {
        let mut root = Term::new("GO:1", "root");
        root.add_synonym("top");
        let mut a = Term::new("GO:2", "a");
        a.add_relation("GO:1", RelationKind::IsA);
        let mut b = Term::new("GO:3", "b");
        b.add_relation("GO:1", RelationKind::IsA);
        let dag = DagBuilder::build(vec![root, a, b]).unwrap();

        let mut genes = GeneIndex::default();
        genes.add_association(&dag, "G1", "a").unwrap();
        genes.add_association(&dag, "G2", "a").unwrap();
        genes.add_association(&dag, "G2", "b").unwrap();

        let mut nodes = NodeGroup::new();
        assert!(genes.collect_nodes(["G1", "G2", "G3"], &mut nodes));
        assert_eq!(nodes.len(), 2);

        nodes.clear();
        assert!(!genes.collect_nodes(["G3"], &mut nodes));
        assert!(nodes.is_empty());
    }

    #[test]
    fn known_term_without_node_is_fatal() {
        let mut dag = small_dag();
        dag.insert_name("ghost", "GO:404".into());

        let mut genes = GeneIndex::default();
        let err = genes.add_association(&dag, "G1", "ghost").unwrap_err();
        assert_eq!(err, BurdenError::MissingNode("GO:404".to_string()));
    }
}
