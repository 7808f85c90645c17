//! Parsing gene to GO term associations
//!
//! The file has two tab-separated columns, the gene symbol and the GO term.
//! The term can be given as identifier, display name or synonym. Such a file
//! can be derived from a GAF file:
//!
//! ```text
//! grep -v '^!' goa_human.gaf | cut -f3,5 | sort -u
//! ```
//!
//! ```text
//! BRCA1	GO:0006281
//! BRCA1	DNA repair
//! TP53	GO:0006974
//! ```
//!
//! Blank lines and lines starting with `#` or `!` are skipped.
use std::io::BufRead;
use std::path::Path;

use tracing::info;

use crate::genes::GeneIndex;
use crate::ontology::EnrichmentDag;
use crate::parser::{invalid_line, open};
use crate::BurdenResult;

/// A single association
#[derive(Debug, PartialEq, Eq)]
struct Association<'a> {
    gene: &'a str,
    term: &'a str,
}

/// Parses a single line. Returns `None` for comments and blank lines
fn parse_line(line: &str) -> Result<Option<Association<'_>>, &'static str> {
    if line.trim().is_empty() || line.starts_with('#') || line.starts_with('!') {
        return Ok(None);
    }
    let Some((gene, term)) = line.split_once('\t') else {
        return Err("tab missing");
    };
    let gene = gene.trim();
    if gene.is_empty() {
        return Err("empty gene");
    }
    Ok(Some(Association {
        gene,
        term: term.trim(),
    }))
}

/// Adds all associations from `reader` to `genes`
///
/// Returns the number of new associations. `source` is only used in
/// error messages.
///
/// # Errors
///
/// - [`crate::BurdenError::InvalidInput`] for lines without tab or gene
/// - [`crate::BurdenError::MissingNode`] if `dag` is inconsistent
pub fn read<R: BufRead>(
    reader: R,
    source: &str,
    dag: &EnrichmentDag,
    genes: &mut GeneIndex,
) -> BurdenResult<usize> {
    let mut added = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| invalid_line(source, idx + 1, &err.to_string()))?;
        let association =
            parse_line(&line).map_err(|reason| invalid_line(source, idx + 1, reason))?;
        if let Some(association) = association {
            if genes.add_association(dag, association.gene, association.term)? {
                added += 1;
            }
        }
    }
    Ok(added)
}

/// Builds the [`GeneIndex`] from the association file `file`
///
/// # Errors
///
/// - [`crate::BurdenError::CannotOpenFile`] if `file` is missing
/// - see [`read`]
pub fn parse<P: AsRef<Path>>(file: P, dag: &EnrichmentDag) -> BurdenResult<GeneIndex> {
    let source = file.as_ref().display().to_string();
    let reader = open(file)?;
    let mut genes = GeneIndex::default();
    let added = read(reader, &source, dag, &mut genes)?;
    info!("Linked {} genes to GO terms ({} associations)", genes.len(), added);
    Ok(genes)
}
