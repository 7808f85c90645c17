//! Ranking of the enrichment nodes and the tab-delimited report
//!
//! Every node that received at least one observation becomes a [`ReportRow`].
//! The rows are sorted by the Fisher p-value of the node, in the direction
//! given by [`RankOrder`]. Nodes with equal p-values keep the DAG order.
//!
//! # Examples
//!
//! ```
//! use goburden::{AlleleCounts, DagBuilder, Term};
//! use goburden::propagation::Propagator;
//! use goburden::report::{rank, write_report, RankOrder};
//!
//! let mut dag = DagBuilder::build(vec![Term::new("GO:1", "root")]).unwrap();
//! let mut output = Vec::new();
//!
//! // nothing was observed, nothing is reported
//! write_report(&rank(&dag, RankOrder::default()), &mut output).unwrap();
//! assert!(output.is_empty());
//!
//! let root = dag.node_id(&"GO:1".into()).unwrap();
//! Propagator::new(dag.len()).propagate(&mut dag, [root], &AlleleCounts::new(3, 0, 0, 3));
//!
//! write_report(&rank(&dag, RankOrder::default()), &mut output).unwrap();
//! let report = String::from_utf8(output).unwrap();
//! let columns: Vec<&str> = report.trim_end().split('\t').collect();
//! assert_eq!(columns[0], "GO:1");
//! let score: f64 = columns[1].parse().unwrap();
//! assert!((score - 0.1).abs() < 1e-9);
//! assert_eq!(columns[2..], ["root", "3", "0", "0", "3"]);
//! ```
use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;

use tracing::debug;

use crate::ontology::EnrichmentDag;
use crate::term::TermId;
use crate::variant::AlleleCounts;
use crate::{BurdenError, BurdenResult};

/// Direction of the ranking
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RankOrder {
    /// Ascending p-value, the most significant term first
    #[default]
    MostSignificantFirst,
    /// Descending p-value, the least significant term first
    SourceOrder,
}

impl FromStr for RankOrder {
    type Err = BurdenError;
    fn from_str(s: &str) -> BurdenResult<Self> {
        match s.to_lowercase().as_str() {
            "ascending" | "most-significant-first" => Ok(RankOrder::MostSignificantFirst),
            "descending" | "source" => Ok(RankOrder::SourceOrder),
            _ => Err(BurdenError::InvalidInput(format!("unknown rank order {s}"))),
        }
    }
}

impl Display for RankOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankOrder::MostSignificantFirst => write!(f, "ascending"),
            RankOrder::SourceOrder => write!(f, "descending"),
        }
    }
}

/// Scores below this are written in scientific notation
const SCIENTIFIC_BELOW: f64 = 1e-3;

/// One line of the report
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    term_id: TermId,
    score: f64,
    term_name: String,
    counts: AlleleCounts,
}

impl ReportRow {
    /// The identifier of the term
    pub fn term_id(&self) -> &TermId {
        &self.term_id
    }

    /// The Fisher p-value of the node
    pub fn score(&self) -> f64 {
        self.score
    }

    /// The display name of the term
    pub fn term_name(&self) -> &str {
        &self.term_name
    }

    /// The accumulated counts of the node
    pub fn counts(&self) -> &AlleleCounts {
        &self.counts
    }
}

impl Display for ReportRow {
    /// `term_id, score, term_name, u_ref, u_alt, a_ref, a_alt`, tab-delimited
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t", self.term_id)?;
        if self.score > 0.0 && self.score < SCIENTIFIC_BELOW {
            write!(f, "{:e}", self.score)?;
        } else {
            write!(f, "{}", self.score)?;
        }
        write!(
            f,
            "\t{}\t{}\t{}\t{}\t{}",
            self.term_name,
            self.counts.unaffected_ref,
            self.counts.unaffected_alt,
            self.counts.affected_ref,
            self.counts.affected_alt
        )
    }
}

/// Ranks all observed nodes of `dag`
///
/// Nodes without any observation are not part of the result.
pub fn rank(dag: &EnrichmentDag, order: RankOrder) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = dag
        .nodes()
        .filter(|node| !node.counts().is_empty())
        .map(|node| ReportRow {
            term_id: node.id().clone(),
            score: node.pvalue(),
            term_name: node.name().to_string(),
            counts: *node.counts(),
        })
        .collect();

    // `sort_by` is stable, ties stay in DAG order
    match order {
        RankOrder::MostSignificantFirst => rows.sort_by(|a, b| a.score.total_cmp(&b.score)),
        RankOrder::SourceOrder => rows.sort_by(|a, b| b.score.total_cmp(&a.score)),
    }
    debug!("Ranked {} of {} nodes", rows.len(), dag.len());
    rows
}

/// Writes `rows` to `writer`, one line per row and without header
///
/// # Errors
///
/// [`BurdenError::Io`] if writing fails
pub fn write_report<W: Write>(rows: &[ReportRow], writer: &mut W) -> BurdenResult<()> {
    for row in rows {
        writeln!(writer, "{row}")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::propagation::Propagator;
    use crate::term::RelationKind;
    use crate::{DagBuilder, Term};

    fn dag() -> EnrichmentDag {
        let mut terms = vec![Term::new("R", "root")];
        for id in ["A", "B", "C", "D"] {
            let mut term = Term::new(id, &id.to_lowercase());
            term.add_relation("R", RelationKind::IsA);
            terms.push(term);
        }
        DagBuilder::build(terms).unwrap()
    }

    fn hit(dag: &mut EnrichmentDag, terms: &[&str], counts: AlleleCounts) {
        let hits: Vec<_> = terms
            .iter()
            .map(|t| dag.node_id(&TermId::from(*t)).unwrap())
            .collect();
        Propagator::new(dag.len()).propagate(dag, hits, &counts);
    }

    fn ids(rows: &[ReportRow]) -> Vec<&str> {
        rows.iter().map(|row| row.term_id().as_str()).collect()
    }

    #[test]
    fn unobserved_nodes_are_filtered() {
        let mut dag = dag();
        hit(&mut dag, &["A"], AlleleCounts::new(2, 0, 0, 2));
        let rows = rank(&dag, RankOrder::default());
        assert_eq!(ids(&rows), ["R", "A"]);
    }

    #[test]
    fn observed_without_alt_is_reported() {
        let mut dag = dag();
        hit(&mut dag, &["B"], AlleleCounts::new(4, 0, 4, 0));
        let rows = rank(&dag, RankOrder::default());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.score() == 1.0));
    }

    #[test]
    fn both_directions() {
        let mut dag = dag();
        // A: p = 1/3, B: p = 1.0, R: accumulated (4, 1, 1, 2)
        hit(&mut dag, &["A"], AlleleCounts::new(2, 0, 0, 2));
        hit(&mut dag, &["B"], AlleleCounts::new(2, 1, 1, 0));

        let ascending = rank(&dag, RankOrder::MostSignificantFirst);
        assert_eq!(ascending.first().unwrap().term_id(), "A");
        assert!(ascending.windows(2).all(|w| w[0].score() <= w[1].score()));

        let descending = rank(&dag, RankOrder::SourceOrder);
        assert_eq!(descending.last().unwrap().term_id(), "A");
        assert!(descending.windows(2).all(|w| w[0].score() >= w[1].score()));
    }

    #[test]
    fn ties_keep_dag_order() {
        let mut dag = dag();
        for term in ["D", "B", "C"] {
            hit(&mut dag, &[term], AlleleCounts::new(1, 0, 1, 0));
        }
        assert_eq!(ids(&rank(&dag, RankOrder::MostSignificantFirst)), ["R", "B", "C", "D"]);
        assert_eq!(ids(&rank(&dag, RankOrder::SourceOrder)), ["R", "B", "C", "D"]);
    }

    #[test]
    fn ranking_is_repeatable() {
        let mut dag = dag();
        hit(&mut dag, &["A", "C"], AlleleCounts::new(5, 1, 2, 4));
        hit(&mut dag, &["D"], AlleleCounts::new(0, 3, 3, 0));

        let render = |rows: &[ReportRow]| {
            let mut out = Vec::new();
            write_report(rows, &mut out).unwrap();
            out
        };
        let first = render(&rank(&dag, RankOrder::default()));
        let second = render(&rank(&dag, RankOrder::default()));
        assert_eq!(first, second);
    }

    #[test]
    fn row_columns() {
        let mut dag = dag();
        hit(&mut dag, &["C"], AlleleCounts::new(1, 2, 3, 4));
        let rows = rank(&dag, RankOrder::default());
        let line = rows[0].to_string();
        let columns: Vec<&str> = line.split('\t').collect();
        assert_eq!(columns.len(), 7);
        assert_eq!(&columns[2..], ["root", "1", "2", "3", "4"]);
    }

    #[test]
    fn small_scores_are_scientific() {
        let row = |score: f64| ReportRow {
            term_id: TermId::from("GO:1"),
            score,
            term_name: "root".to_string(),
            counts: AlleleCounts::new(1, 0, 0, 1),
        };
        assert!(row(1e-239).to_string().starts_with("GO:1\t1e-239\troot\t"));
        assert!(row(2.5e-4).to_string().starts_with("GO:1\t2.5e-4\t"));
        assert!(row(0.5).to_string().starts_with("GO:1\t0.5\t"));
        assert!(row(1.0).to_string().starts_with("GO:1\t1\t"));
        assert!(row(0.0).to_string().starts_with("GO:1\t0\t"));

        let mut dag = dag();
        hit(&mut dag, &["A"], AlleleCounts::new(400, 0, 0, 400));
        let rows = rank(&dag, RankOrder::default());
        let line = rows[0].to_string();
        let score = line.split('\t').nth(1).unwrap();
        assert!(score.len() < 30, "{score}");
        assert!(score.parse::<f64>().unwrap() < 1e-100);
    }

    #[test]
    fn parse_rank_order() {
        assert_eq!("ascending".parse::<RankOrder>().unwrap(), RankOrder::MostSignificantFirst);
        assert_eq!("Descending".parse::<RankOrder>().unwrap(), RankOrder::SourceOrder);
        assert!("sideways".parse::<RankOrder>().is_err());
        assert_eq!(RankOrder::SourceOrder.to_string(), "descending");
    }
}
