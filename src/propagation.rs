//! Propagation of variant counts to all ancestors of the hit nodes
//!
//! A variant adds its [`AlleleCounts`] to every node its genes are annotated
//! to and to every ancestor of those nodes. A node that is reachable via
//! several paths (diamond ancestry) or that is hit directly and as an
//! ancestor of another hit node must still receive the counts only once per
//! variant.
//!
//! The [`Propagator`] keeps the visit marks outside of the nodes. Each
//! propagation pass draws a new generation token and a node counts as
//! visited if its mark equals the current token, so starting a new pass
//! resets all marks at once.
use tracing::trace;

use crate::ontology::{EnrichmentDag, NodeId};
use crate::variant::AlleleCounts;

/// Adds variant counts to hit nodes and all their ancestors, once per node
///
/// # Examples
///
/// ```
/// use goburden::{AlleleCounts, DagBuilder, Term};
/// use goburden::propagation::Propagator;
/// use goburden::term::RelationKind;
///
/// let a = Term::new("A", "a");
/// let mut b = Term::new("B", "b");
/// b.add_relation("A", RelationKind::IsA);
/// let mut c = Term::new("C", "c");
/// c.add_relation("A", RelationKind::IsA);
/// let mut dag = DagBuilder::build(vec![a, b, c]).unwrap();
///
/// let hits = [dag.node_id(&"B".into()).unwrap(), dag.node_id(&"C".into()).unwrap()];
/// let counts = AlleleCounts::new(1, 0, 0, 1);
///
/// let mut propagator = Propagator::new(dag.len());
/// assert_eq!(propagator.propagate(&mut dag, hits, &counts), 3);
///
/// // A is an ancestor of both hits, but counted once
/// let root = dag.node_id(&"A".into()).unwrap();
/// assert_eq!(dag.get(root).unwrap().counts(), &counts);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Propagator {
    marks: Vec<u32>,
    generation: u32,
    stack: Vec<NodeId>,
}

impl Propagator {
    /// Constructs a new propagator for a DAG with `len` nodes
    pub fn new(len: usize) -> Self {
        Self {
            marks: vec![0; len],
            generation: 0,
            stack: Vec::new(),
        }
    }

    /// Starts a new propagation pass
    ///
    /// All nodes are unvisited afterwards. This is a constant-time
    /// operation, except when the generation counter wraps around.
    pub fn reset_visited(&mut self, len: usize) {
        if self.marks.len() < len {
            self.marks.resize(len, 0);
        }
        self.generation = match self.generation.checked_add(1) {
            Some(generation) => generation,
            None => {
                self.marks.iter_mut().for_each(|mark| *mark = 0);
                1
            }
        };
    }

    fn is_visited(&self, id: NodeId) -> bool {
        self.marks[id.as_usize()] == self.generation
    }

    fn mark_visited(&mut self, id: NodeId) {
        self.marks[id.as_usize()] = self.generation;
    }

    /// Adds `counts` to all `hits` and their ancestors
    ///
    /// Every node is updated at most once, no matter how many paths lead to
    /// it. Handles that do not belong to `dag` are ignored.
    ///
    /// Returns the number of updated nodes.
    pub fn propagate<I>(&mut self, dag: &mut EnrichmentDag, hits: I, counts: &AlleleCounts) -> usize
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.reset_visited(dag.len());
        let mut updated = 0usize;

        for hit in hits {
            if hit.as_usize() >= dag.len() {
                trace!("Ignoring foreign handle {}", hit);
                continue;
            }
            self.stack.push(hit);
            while let Some(id) = self.stack.pop() {
                if self.is_visited(id) {
                    continue;
                }
                self.mark_visited(id);
                let Some(node) = dag.get_mut(id) else {
                    continue;
                };
                node.accumulate(counts);
                updated += 1;
                for parent in node.parents() {
                    if !self.is_visited(*parent) {
                        self.stack.push(*parent);
                    }
                }
            }
        }
        updated
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::RelationKind;
    use crate::{DagBuilder, Term};

    /// ```text
    ///       A
    ///      / \
    ///     B   C
    ///      \ / \
    ///       D   E
    ///       |
    ///       F
    /// ```
    fn dag() -> EnrichmentDag {
        let mut terms = vec![Term::new("A", "a")];
        for (id, parents) in [
            ("B", vec!["A"]),
            ("C", vec!["A"]),
            ("D", vec!["B", "C"]),
            ("E", vec!["C"]),
            ("F", vec!["D"]),
        ] {
            let mut term = Term::new(id, id);
            for parent in parents {
                term.add_relation(parent, RelationKind::IsA);
            }
            terms.push(term);
        }
        DagBuilder::build(terms).unwrap()
    }

    fn id(dag: &EnrichmentDag, term: &str) -> NodeId {
        dag.node_id(&term.into()).unwrap()
    }

    fn counts_of(dag: &EnrichmentDag, term: &str) -> AlleleCounts {
        *dag.get(id(dag, term)).unwrap().counts()
    }

    #[test]
    fn diamond_is_counted_once() {
        let mut dag = dag();
        let mut propagator = Propagator::new(dag.len());
        let counts = AlleleCounts::new(1, 2, 3, 4);

        let hits = [id(&dag, "F")];
        assert_eq!(propagator.propagate(&mut dag, hits, &counts), 5);

        for term in ["A", "B", "C", "D", "F"] {
            assert_eq!(counts_of(&dag, term), counts, "{term}");
        }
        assert!(counts_of(&dag, "E").is_empty());
    }

    #[test]
    fn shared_ancestor_of_two_hits() {
        let mut dag = dag();
        let mut propagator = Propagator::new(dag.len());
        let counts = AlleleCounts::new(2, 0, 0, 2);

        let hits = [id(&dag, "D"), id(&dag, "E")];
        assert_eq!(propagator.propagate(&mut dag, hits, &counts), 5);
        assert_eq!(counts_of(&dag, "A"), counts);
        assert_eq!(counts_of(&dag, "C"), counts);
        assert!(counts_of(&dag, "F").is_empty());
    }

    #[test]
    fn hit_that_is_ancestor_of_another_hit() {
        let mut dag = dag();
        let mut propagator = Propagator::new(dag.len());
        let counts = AlleleCounts::new(1, 1, 1, 1);

        // gene annotated at two granularities
        let hits = [id(&dag, "B"), id(&dag, "F"), id(&dag, "F")];
        propagator.propagate(&mut dag, hits, &counts);
        assert_eq!(counts_of(&dag, "B"), counts);
        assert_eq!(counts_of(&dag, "A"), counts);
    }

    #[test]
    fn visits_reset_between_variants() {
        let mut dag = dag();
        let mut propagator = Propagator::new(dag.len());
        let first = AlleleCounts::new(1, 0, 0, 0);
        let second = AlleleCounts::new(0, 0, 0, 1);

        let f = id(&dag, "F");
        let e = id(&dag, "E");
        propagator.propagate(&mut dag, [f], &first);
        propagator.propagate(&mut dag, [e], &second);
        propagator.propagate(&mut dag, [f, e], &second);

        assert_eq!(counts_of(&dag, "A"), AlleleCounts::new(1, 0, 0, 2));
        assert_eq!(counts_of(&dag, "C"), AlleleCounts::new(1, 0, 0, 2));
        assert_eq!(counts_of(&dag, "B"), AlleleCounts::new(1, 0, 0, 1));
        assert_eq!(counts_of(&dag, "E"), AlleleCounts::new(0, 0, 0, 2));
    }

    #[test]
    fn order_of_variants_does_not_matter() {
        let variants = [
            (vec!["F"], AlleleCounts::new(3, 1, 0, 2)),
            (vec!["E", "B"], AlleleCounts::new(1, 1, 1, 1)),
            (vec!["C"], AlleleCounts::new(0, 5, 2, 0)),
            (vec!["D", "E"], AlleleCounts::new(7, 0, 1, 1)),
        ];

        let run = |order: &[usize]| {
            let mut dag = dag();
            let mut propagator = Propagator::new(dag.len());
            for idx in order {
                let (terms, counts) = &variants[*idx];
                let hits: Vec<NodeId> = terms.iter().map(|t| id(&dag, t)).collect();
                propagator.propagate(&mut dag, hits, counts);
            }
            dag.nodes().map(|node| *node.counts()).collect::<Vec<_>>()
        };

        let forward = run(&[0, 1, 2, 3]);
        assert_eq!(forward, run(&[3, 2, 1, 0]));
        assert_eq!(forward, run(&[2, 0, 3, 1]));

        // additivity: the root sees every variant exactly once
        let total = variants
            .iter()
            .fold(AlleleCounts::default(), |acc, (_, counts)| acc + *counts);
        assert_eq!(forward[0], total);
    }

    #[test]
    fn generation_wraps_around() {
        let mut dag = dag();
        let mut propagator = Propagator::new(dag.len());
        propagator.generation = u32::MAX - 1;
        let counts = AlleleCounts::new(1, 0, 0, 0);
        let f = id(&dag, "F");

        for _ in 0..3 {
            propagator.propagate(&mut dag, [f], &counts);
        }
        assert_eq!(counts_of(&dag, "A"), AlleleCounts::new(3, 0, 0, 0));
        assert_eq!(propagator.generation, 2);
    }

    #[test]
    fn foreign_handles_are_ignored() {
        let mut dag = dag();
        let mut propagator = Propagator::default();
        let counts = AlleleCounts::new(1, 0, 0, 0);
        assert_eq!(propagator.propagate(&mut dag, [NodeId::from(99)], &counts), 0);
        let a = id(&dag, "A");
        assert_eq!(propagator.propagate(&mut dag, [a], &counts), 1);
    }
}
