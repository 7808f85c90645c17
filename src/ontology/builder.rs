use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::ontology::termarena::Arena;
use crate::ontology::{EnrichmentDag, EnrichmentNode, Parents};
use crate::term::{Term, TermId};
use crate::{BurdenError, BurdenResult};

/// Resolves a flat list of [`Term`]s into an [`EnrichmentDag`]
///
/// Terms may reference parents that appear later in the list. The builder
/// repeatedly sweeps the list of pending terms and resolves every term whose
/// parents are all resolved already, including parents resolved earlier in
/// the same sweep. A term's parents therefore always exist before the term
/// itself, which makes the result acyclic by construction.
///
/// ```text
/// pending: [D -> (B, C), B -> A, C -> A, A]
/// pass 1:  A
/// pass 2:  B, C      (D waits for B and C)
/// pass 3:  D
/// ```
pub struct DagBuilder;

impl DagBuilder {
    /// Builds the DAG from all `terms`
    ///
    /// # Errors
    ///
    /// - [`BurdenError::DuplicateTerm`] if two terms share an identifier
    /// - [`BurdenError::UnresolvableReference`] if a sweep resolves no term
    ///   while terms are still pending. This happens when a parent does not
    ///   exist or when terms form a cycle. The error lists all pending terms.
    ///
    /// # Examples
    ///
    /// ```
    /// use goburden::{BurdenError, DagBuilder, Term};
    /// use goburden::term::RelationKind;
    ///
    /// let mut a = Term::new("A", "a");
    /// a.add_relation("B", RelationKind::IsA);
    /// let mut b = Term::new("B", "b");
    /// b.add_relation("A", RelationKind::IsA);
    ///
    /// let err = DagBuilder::build(vec![a, b]).unwrap_err();
    /// assert_eq!(
    ///     err,
    ///     BurdenError::UnresolvableReference(vec!["A".to_string(), "B".to_string()])
    /// );
    /// ```
    pub fn build(terms: Vec<Term>) -> BurdenResult<EnrichmentDag> {
        let names = Self::name_index(&terms)?;
        let mut arena = Arena::with_capacity(terms.len());

        let mut pending = terms;
        let mut pass = 0usize;
        while !pending.is_empty() {
            pass += 1;
            let before = pending.len();
            let mut unresolved = Vec::with_capacity(before);
            for term in pending {
                match Self::resolved_parents(&arena, &term) {
                    Some(parents) => {
                        arena.insert(EnrichmentNode::new(term, parents));
                    }
                    None => unresolved.push(term),
                }
            }

            if unresolved.len() == before {
                let mut ids: Vec<String> = unresolved
                    .iter()
                    .map(|term| term.id().to_string())
                    .collect();
                ids.sort();
                return Err(BurdenError::UnresolvableReference(ids));
            }
            debug!(
                "Pass {}: resolved {} terms, {} pending",
                pass,
                before - unresolved.len(),
                unresolved.len()
            );
            pending = unresolved;
        }

        info!("Resolved {} terms in {} passes", arena.len(), pass);
        Ok(EnrichmentDag::new(arena, names))
    }

    /// Returns the handles of all parents of `term` or `None` if at least
    /// one parent is not resolved yet
    fn resolved_parents(arena: &Arena, term: &Term) -> Option<Parents> {
        let mut parents = Parents::new();
        for relation in term.relations() {
            let parent = arena.node_id(relation.target())?;
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
        Some(parents)
    }

    /// Maps display names and synonyms to term identifiers
    ///
    /// Display names take precedence over synonyms. If several terms share
    /// a name, the first one wins.
    fn name_index(terms: &[Term]) -> BurdenResult<HashMap<String, TermId>> {
        let mut ids: HashSet<&TermId> = HashSet::with_capacity(terms.len());
        let mut names: HashMap<String, TermId> = HashMap::with_capacity(terms.len() * 2);
        for term in terms {
            if !ids.insert(term.id()) {
                return Err(BurdenError::DuplicateTerm(term.id().to_string()));
            }
            names
                .entry(term.name().to_string())
                .or_insert_with(|| term.id().clone());
        }
        for term in terms {
            for synonym in term.synonyms() {
                names
                    .entry(synonym.clone())
                    .or_insert_with(|| term.id().clone());
            }
        }
        Ok(names)
    }
}
