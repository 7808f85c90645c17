//! Case/control assignment from a pedigree (`.ped`) file
//!
//! ```text
//! #family individual father mother sex phenotype
//! F1      case1      0      0      1   2
//! F2      ctrl1      0      0      2   1
//! F3      other      0      0      2   0
//! ```
//!
//! Phenotype `2` marks affected, `1` unaffected individuals. Individuals
//! with any other phenotype are ignored.
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::cohort::{CohortSource, Person, Status};
use crate::parser::{invalid_line, open};
use crate::BurdenResult;

/// The individuals of a pedigree file with known affection status
///
/// # Examples
///
/// ```
/// use goburden::cohort::{CohortSource, Status};
/// use goburden::parser::pedigree::Pedigree;
///
/// let ped = "F1 S1 0 0 1 2\nF1 S2 0 0 2 1\nF2 S3 0 0 1 2\n";
/// let pedigree = Pedigree::read(ped.as_bytes(), "cohort.ped").unwrap();
///
/// // S3 has no genotypes
/// let samples = vec!["S1".to_string(), "S2".to_string()];
/// let persons = pedigree.extract(&samples).unwrap();
/// assert_eq!(persons.len(), 2);
/// assert_eq!(persons[0].status(), Status::Affected);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pedigree {
    persons: Vec<Person>,
    status_of: HashMap<String, Status>,
}

/// Affection status of a PED phenotype code, `None` for unknown
pub(crate) fn phenotype(code: &str) -> Option<Status> {
    match code {
        "2" => Some(Status::Affected),
        "1" => Some(Status::Unaffected),
        _ => None,
    }
}

impl Pedigree {
    /// Parses the pedigree file `file`
    ///
    /// # Errors
    ///
    /// - [`crate::BurdenError::CannotOpenFile`] if `file` is missing
    /// - see [`Pedigree::read`]
    pub fn parse<P: AsRef<Path>>(file: P) -> BurdenResult<Self> {
        let source = file.as_ref().display().to_string();
        let reader = open(file)?;
        Self::read(reader, &source)
    }

    /// Reads a pedigree from `reader`. `source` is only used in error messages
    ///
    /// # Errors
    ///
    /// [`crate::BurdenError::InvalidInput`] if a line has fewer than six
    /// columns or an individual is listed as affected and unaffected
    pub fn read<R: BufRead>(reader: R, source: &str) -> BurdenResult<Self> {
        let mut pedigree = Self::default();
        for (idx, line) in reader.lines().enumerate() {
            let lineno = idx + 1;
            let line = line.map_err(|err| invalid_line(source, lineno, &err.to_string()))?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 6 {
                return Err(invalid_line(source, lineno, "expected 6 columns"));
            }
            let id = cols[1];
            let Some(status) = phenotype(cols[5]) else {
                debug!("Ignoring {} with phenotype {}", id, cols[5]);
                continue;
            };
            pedigree
                .insert(id, status)
                .map_err(|reason| invalid_line(source, lineno, &reason))?;
        }
        Ok(pedigree)
    }

    /// Adds the individual `id`, repeated identical entries are ignored
    ///
    /// Returns the reason if `id` is already known with another status.
    pub(crate) fn insert(&mut self, id: &str, status: Status) -> Result<(), String> {
        match self.status_of.get(id) {
            Some(known) if *known == status => Ok(()),
            Some(known) => Err(format!("{id} is both {known} and {status}")),
            None => {
                self.status_of.insert(id.to_string(), status);
                self.persons.push(Person::new(id, status));
                Ok(())
            }
        }
    }

    /// All individuals with known affection status
    pub fn persons(&self) -> &[Person] {
        &self.persons
    }
}

impl CohortSource for Pedigree {
    fn extract(&self, samples: &[String]) -> BurdenResult<Vec<Person>> {
        let persons: Vec<Person> = self
            .persons
            .iter()
            .filter(|person| samples.iter().any(|sample| sample == person.id()))
            .cloned()
            .collect();
        debug!(
            "{} of {} individuals of the pedigree have genotypes",
            persons.len(),
            self.persons.len()
        );
        Ok(persons)
    }
}
