//! Statistical analyses of the accumulated case/control counts
//!
//! Every [`crate::EnrichmentNode`] holds a 2x2 table of unaffected/affected
//! individuals versus reference-only/non-reference genotypes:
//!
//! ```text
//!             ref        alt
//! unaffected  u_ref      u_alt
//! affected    a_ref      a_alt
//! ```
//!
//! At the moment, `goburden` provides the two-tailed Fisher's exact test
//! ([`fisher::two_tailed`]) on this table.

use crate::variant::AlleleCounts;

pub mod fisher;

/// A 2x2 contingency table of unaffected/affected versus ref/alt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContingencyTable {
    unaffected_ref: u64,
    unaffected_alt: u64,
    affected_ref: u64,
    affected_alt: u64,
}

impl ContingencyTable {
    /// Constructs a new table, row by row
    pub fn new(unaffected_ref: u64, unaffected_alt: u64, affected_ref: u64, affected_alt: u64) -> Self {
        Self {
            unaffected_ref,
            unaffected_alt,
            affected_ref,
            affected_alt,
        }
    }

    /// The top-left cell
    pub fn unaffected_ref(&self) -> u64 {
        self.unaffected_ref
    }

    /// Sum of the first row
    pub fn unaffected(&self) -> u64 {
        self.unaffected_ref + self.unaffected_alt
    }

    /// Sum of the second row
    pub fn affected(&self) -> u64 {
        self.affected_ref + self.affected_alt
    }

    /// Sum of the first column
    pub fn reference(&self) -> u64 {
        self.unaffected_ref + self.affected_ref
    }

    /// Sum of the second column
    pub fn alternate(&self) -> u64 {
        self.unaffected_alt + self.affected_alt
    }

    /// Sum of all cells
    pub fn total(&self) -> u64 {
        self.unaffected() + self.affected()
    }

    /// Returns `true` if any row or column sums to zero
    pub fn has_empty_margin(&self) -> bool {
        self.unaffected() == 0
            || self.affected() == 0
            || self.reference() == 0
            || self.alternate() == 0
    }
}

impl From<AlleleCounts> for ContingencyTable {
    fn from(counts: AlleleCounts) -> Self {
        Self::new(
            counts.unaffected_ref,
            counts.unaffected_alt,
            counts.affected_ref,
            counts.affected_alt,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn margins() {
        let table = ContingencyTable::new(1, 2, 3, 4);
        assert_eq!(table.unaffected(), 3);
        assert_eq!(table.affected(), 7);
        assert_eq!(table.reference(), 4);
        assert_eq!(table.alternate(), 6);
        assert_eq!(table.total(), 10);
        assert!(!table.has_empty_margin());
    }

    #[test]
    fn empty_margins() {
        assert!(ContingencyTable::default().has_empty_margin());
        assert!(ContingencyTable::new(3, 0, 4, 0).has_empty_margin());
        assert!(ContingencyTable::new(0, 0, 4, 1).has_empty_margin());
    }

    #[test]
    fn from_counts() {
        let table = ContingencyTable::from(AlleleCounts::new(5, 6, 7, 8));
        assert_eq!(table, ContingencyTable::new(5, 6, 7, 8));
    }
}
