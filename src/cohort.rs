//! Case/control assignment of the samples
use std::collections::HashMap;
use std::fmt::Display;

use tracing::info;

use crate::{BurdenError, BurdenResult};

/// Affection status of an individual
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// Case
    Affected,
    /// Control
    Unaffected,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Affected => write!(f, "affected"),
            Status::Unaffected => write!(f, "unaffected"),
        }
    }
}

/// A sample with known affection status
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Person {
    id: String,
    status: Status,
}

impl Person {
    /// Constructs a new person
    pub fn new(id: &str, status: Status) -> Self {
        Self {
            id: id.to_string(),
            status,
        }
    }

    /// The sample identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The affection status
    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns `true` for cases
    pub fn is_affected(&self) -> bool {
        self.status == Status::Affected
    }

    /// Returns `true` for controls
    pub fn is_unaffected(&self) -> bool {
        self.status == Status::Unaffected
    }
}

/// Provides the affection status of the samples of a variant source
pub trait CohortSource {
    /// Returns every person among `samples` with a known affection status
    ///
    /// # Errors
    ///
    /// Implementations return an error if the source is unreadable or malformed
    fn extract(&self, samples: &[String]) -> BurdenResult<Vec<Person>>;
}

/// The validated case/control partition of the samples
///
/// A cohort always contains at least one affected and one unaffected
/// individual, and every sample belongs to exactly one role.
///
/// # Examples
///
/// ```
/// use goburden::BurdenError;
/// use goburden::cohort::{Cohort, Person, Status};
///
/// let cohort = Cohort::try_from(vec![
///     Person::new("S1", Status::Affected),
///     Person::new("S2", Status::Unaffected),
/// ]).unwrap();
/// assert_eq!(cohort.affected(), &["S1".to_string()]);
///
/// let err = Cohort::try_from(vec![Person::new("S1", Status::Affected)]).unwrap_err();
/// assert_eq!(err, BurdenError::NoUnaffected);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Cohort {
    affected: Vec<String>,
    unaffected: Vec<String>,
}

impl Cohort {
    /// Identifiers of all affected individuals (cases)
    pub fn affected(&self) -> &[String] {
        &self.affected
    }

    /// Identifiers of all unaffected individuals (controls)
    pub fn unaffected(&self) -> &[String] {
        &self.unaffected
    }

    /// Total number of individuals
    pub fn len(&self) -> usize {
        self.affected.len() + self.unaffected.len()
    }

    /// Returns `true` if the cohort has no individuals
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<Vec<Person>> for Cohort {
    type Error = BurdenError;
    /// Validates the partition
    ///
    /// # Errors
    ///
    /// - [`BurdenError::InvalidInput`] if a person is listed as affected and unaffected
    /// - [`BurdenError::NoAffected`] if there is no case
    /// - [`BurdenError::NoUnaffected`] if there is no control
    fn try_from(persons: Vec<Person>) -> BurdenResult<Self> {
        let mut seen: HashMap<String, Status> = HashMap::with_capacity(persons.len());
        let mut cohort = Cohort::default();
        for person in persons {
            match seen.get(person.id()) {
                Some(status) if *status == person.status() => continue,
                Some(status) => {
                    return Err(BurdenError::InvalidInput(format!(
                        "{} is both {} and {}",
                        person.id(),
                        status,
                        person.status()
                    )))
                }
                None => {}
            }
            seen.insert(person.id().to_string(), person.status());
            match person.status() {
                Status::Affected => cohort.affected.push(person.id),
                Status::Unaffected => cohort.unaffected.push(person.id),
            }
        }
        if cohort.affected.is_empty() {
            return Err(BurdenError::NoAffected);
        }
        if cohort.unaffected.is_empty() {
            return Err(BurdenError::NoUnaffected);
        }
        info!(
            "Cohort with {} affected and {} unaffected individuals",
            cohort.affected.len(),
            cohort.unaffected.len()
        );
        Ok(cohort)
    }
}
