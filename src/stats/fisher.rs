//! Two-tailed Fisher's exact test for 2x2 tables
//!
//! All tables with the same margins as the observed table follow a
//! hypergeometric distribution of the top-left cell. The p-value is the sum
//! of the probabilities of all tables that are at most as likely as the
//! observed one.
//!
//! # Examples
//!
//! ```
//! use goburden::stats::ContingencyTable;
//! use goburden::stats::fisher::two_tailed;
//!
//! // 2 controls hom-ref, 2 cases carrying the alt allele
//! let pvalue = two_tailed(&ContingencyTable::new(2, 0, 0, 2));
//! assert!((pvalue - 1.0 / 3.0).abs() < 1e-9);
//!
//! // no alt allele at all
//! assert_eq!(two_tailed(&ContingencyTable::new(5, 0, 7, 0)), 1.0);
//! ```
use statrs::distribution::{Discrete, Hypergeometric};
use tracing::debug;

use crate::stats::ContingencyTable;

/// Relative tolerance when comparing table probabilities to the observed one
///
/// Tables whose probability equals the observed probability up to rounding
/// must be counted as "at least as extreme".
const RELATIVE_ERROR: f64 = 1e-7;

/// Calculates the two-tailed Fisher's exact test p-value of `table`
///
/// Tables with an empty row or column have a p-value of `1.0`.
pub fn two_tailed(table: &ContingencyTable) -> f64 {
    if table.has_empty_margin() {
        return 1.0;
    }

    let population = table.total();
    let successes = table.reference();
    let draws = table.unaffected();

    let hyper = match Hypergeometric::new(population, successes, draws) {
        Ok(hyper) => hyper,
        Err(err) => {
            debug!("Invalid table {:?}: {}", table, err);
            return 1.0;
        }
    };

    let min = (draws + successes).saturating_sub(population);
    let max = successes.min(draws);

    // compare in log-space, the probabilities of large tables underflow
    let cutoff = hyper.ln_pmf(table.unaffected_ref()) + RELATIVE_ERROR.ln_1p();
    let pvalue: f64 = (min..=max)
        .map(|k| hyper.ln_pmf(k))
        .filter(|ln_p| *ln_p <= cutoff)
        .map(f64::exp)
        .sum();

    pvalue.min(1.0)
}
