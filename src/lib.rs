//! Case/control variant burden enrichment over Gene Ontology terms
//!
//! `goburden` pushes per-variant case/control allele counts through an
//! ontology DAG and ranks every term by the Fisher's exact test p-value
//! of its accumulated 2x2 table.
//!
//! The main entry points are [`DagBuilder`] to resolve an ontology into an
//! [`EnrichmentDag`], [`GeneIndex`] to map genes onto the DAG and
//! [`engine::BurdenEngine`] to scan variants and produce the ranked report.
//!
//! # Examples
//!
//! ```
//! use goburden::{DagBuilder, GeneIndex, Term};
//! use goburden::cohort::{Cohort, Person, Status};
//! use goburden::engine::BurdenEngine;
//! use goburden::report::RankOrder;
//! use goburden::term::RelationKind;
//! use goburden::variant::{Genotype, Variant};
//!
//! let root = Term::new("GO:1", "root");
//! let mut child = Term::new("GO:2", "child");
//! child.add_relation("GO:1", RelationKind::IsA);
//!
//! let dag = DagBuilder::build(vec![child, root]).unwrap();
//! let mut genes = GeneIndex::default();
//! genes.add_association(&dag, "G1", "child").unwrap();
//!
//! let cohort = Cohort::try_from(vec![
//!     Person::new("case1", Status::Affected),
//!     Person::new("ctrl1", Status::Unaffected),
//! ]).unwrap();
//!
//! let mut variant = Variant::new("chr1", 100, "A", vec!["T".into()]);
//! variant.set_genotype("case1", Genotype::try_from("0/1").unwrap());
//! variant.set_genotype("ctrl1", Genotype::try_from("0/0").unwrap());
//!
//! let mut engine = BurdenEngine::new(dag, genes, cohort);
//! assert!(engine.process_genes(&variant, ["G1"]));
//!
//! let rows = engine.rank(RankOrder::MostSignificantFirst);
//! assert_eq!(rows.len(), 2);
//! ```
use std::num::ParseIntError;
use thiserror::Error;

pub mod cohort;
pub mod config;
pub mod engine;
pub mod genes;
pub mod ontology;
pub mod parser;
pub mod propagation;
pub mod report;
pub mod stats;
pub mod term;
pub mod variant;

pub use genes::GeneIndex;
pub use ontology::{DagBuilder, EnrichmentDag, EnrichmentNode, NodeId};
pub use term::{Term, TermId};
pub use variant::AlleleCounts;

const DEFAULT_NUM_PARENTS: usize = 4;
const DEFAULT_NUM_GENE_TERMS: usize = 8;
const DEFAULT_NUM_TERMS: usize = 50_000;

/// Number of processed variants between two progress log lines
const PROGRESS_INTERVAL: u64 = 10_000;

/// Main Error type for this crate
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BurdenError {
    /// An input file is missing or cannot be read
    #[error("unable to open file {0}")]
    CannotOpenFile(String),
    /// A line of an input file is malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Two ontology terms use the same identifier
    #[error("duplicate term identifier {0}")]
    DuplicateTerm(String),
    /// Some terms reference parents that never resolve (missing or cyclic)
    #[error("unresolvable term references: {}", .0.join(", "))]
    UnresolvableReference(Vec<String>),
    /// A term was resolved but has no node in the DAG
    #[error("no node for term {0}")]
    MissingNode(String),
    /// The cohort does not contain any affected individual
    #[error("no affected individual")]
    NoAffected,
    /// The cohort does not contain any unaffected individual
    #[error("no unaffected individual")]
    NoUnaffected,
    /// Writing the report failed
    #[error("unable to write output: {0}")]
    Io(String),
    /// Failed to parse an integer
    #[error("unable to parse Integer")]
    ParseIntError,
}

impl From<ParseIntError> for BurdenError {
    fn from(_: ParseIntError) -> Self {
        BurdenError::ParseIntError
    }
}

impl From<std::io::Error> for BurdenError {
    fn from(err: std::io::Error) -> Self {
        BurdenError::Io(err.to_string())
    }
}

/// Shortcut for `Result<T, BurdenError>`
pub type BurdenResult<T> = Result<T, BurdenError>;
