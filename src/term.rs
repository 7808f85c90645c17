//! Ontology terms as delivered by an [`OntologyLoader`]
//!
//! A [`Term`] is plain data: identifier, display name, synonyms and the
//! outgoing [`Relation`]s to its parent terms. Terms are resolved into
//! [`crate::EnrichmentNode`]s by the [`crate::DagBuilder`].
use core::fmt::Debug;
use std::fmt::Display;
use std::str::FromStr;

use crate::{BurdenError, BurdenResult};

/// The unique identifier of a [`Term`], e.g. `GO:0008150`
#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TermId {
    inner: String,
}

impl TermId {
    /// Returns the identifier as `&str`
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for TermId {
    fn from(s: &str) -> Self {
        TermId {
            inner: s.to_string(),
        }
    }
}

impl From<String> for TermId {
    fn from(inner: String) -> Self {
        TermId { inner }
    }
}

impl Debug for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TermId({})", self)
    }
}

impl Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for TermId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

impl PartialEq<&str> for TermId {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

/// The kind of an edge from a term to its parent
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum RelationKind {
    /// `is_a`
    IsA,
    /// `part_of`
    PartOf,
    /// Any other relationship type, e.g. `regulates`
    Other(String),
}

impl FromStr for RelationKind {
    type Err = BurdenError;
    fn from_str(s: &str) -> BurdenResult<Self> {
        match s.trim() {
            "" => Err(BurdenError::InvalidInput("empty relation kind".to_string())),
            "is_a" => Ok(RelationKind::IsA),
            "part_of" => Ok(RelationKind::PartOf),
            other => Ok(RelationKind::Other(other.to_string())),
        }
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationKind::IsA => write!(f, "is_a"),
            RelationKind::PartOf => write!(f, "part_of"),
            RelationKind::Other(kind) => write!(f, "{kind}"),
        }
    }
}

/// An outgoing edge of a [`Term`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Relation {
    target: TermId,
    kind: RelationKind,
}

impl Relation {
    /// Constructs a new relation pointing to `target`
    pub fn new<I: Into<TermId>>(target: I, kind: RelationKind) -> Self {
        Self {
            target: target.into(),
            kind,
        }
    }

    /// The identifier of the parent term
    pub fn target(&self) -> &TermId {
        &self.target
    }

    /// The kind of the relation
    pub fn kind(&self) -> &RelationKind {
        &self.kind
    }
}

/// A single ontology term
///
/// # Examples
///
/// ```
/// use goburden::Term;
/// use goburden::term::RelationKind;
///
/// let mut term = Term::new("GO:0000002", "mitochondrial genome maintenance");
/// term.add_synonym("mitochondrial DNA maintenance");
/// term.add_relation("GO:0007005", RelationKind::IsA);
///
/// assert_eq!(term.id(), "GO:0000002");
/// assert_eq!(term.relations().len(), 1);
/// assert!(term.has_relations());
/// ```
#[derive(Clone, Debug)]
pub struct Term {
    id: TermId,
    name: String,
    synonyms: Vec<String>,
    relations: Vec<Relation>,
}

impl Term {
    /// Constructs a new term without synonyms and relations
    pub fn new<I: Into<TermId>>(id: I, name: &str) -> Term {
        Term {
            id: id.into(),
            name: name.to_string(),
            synonyms: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// The unique identifier of the term
    pub fn id(&self) -> &TermId {
        &self.id
    }

    /// The display name of the term
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names of the term
    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    /// Outgoing relations, in source order
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Returns `true` if the term points to at least one parent
    pub fn has_relations(&self) -> bool {
        !self.relations.is_empty()
    }

    /// Adds a synonym. Duplicates are ignored
    pub fn add_synonym(&mut self, synonym: &str) {
        if !self.synonyms.iter().any(|s| s == synonym) {
            self.synonyms.push(synonym.to_string());
        }
    }

    /// Adds an outgoing relation to the parent term `target`
    pub fn add_relation<I: Into<TermId>>(&mut self, target: I, kind: RelationKind) {
        self.relations.push(Relation::new(target, kind));
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Term {}

/// Provides the full list of terms of an ontology release
pub trait OntologyLoader {
    /// Loads all terms
    ///
    /// # Errors
    ///
    /// Implementations return an error if the source is unreadable or malformed
    fn load(&self) -> BurdenResult<Vec<Term>>;
}

impl OntologyLoader for Vec<Term> {
    fn load(&self) -> BurdenResult<Vec<Term>> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn relation_kind_from_str() {
        assert_eq!("is_a".parse::<RelationKind>().unwrap(), RelationKind::IsA);
        assert_eq!(
            "part_of".parse::<RelationKind>().unwrap(),
            RelationKind::PartOf
        );
        assert_eq!(
            "regulates".parse::<RelationKind>().unwrap(),
            RelationKind::Other("regulates".to_string())
        );
        assert!(" ".parse::<RelationKind>().is_err());
    }

    #[test]
    fn relation_kind_display() {
        for kind in ["is_a", "part_of", "has_part"] {
            assert_eq!(kind.parse::<RelationKind>().unwrap().to_string(), kind);
        }
    }

    #[test]
    fn synonyms_are_unique() {
        let mut term = Term::new("GO:1", "foo");
        term.add_synonym("bar");
        term.add_synonym("bar");
        term.add_synonym("baz");
        assert_eq!(term.synonyms(), &["bar".to_string(), "baz".to_string()]);
    }

    #[test]
    fn term_equality_uses_id() {
        let a = Term::new("GO:1", "foo");
        let b = Term::new("GO:1", "bar");
        let c = Term::new("GO:2", "foo");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn term_id_display() {
        let id = TermId::from("GO:0008150");
        assert_eq!(id.to_string(), "GO:0008150");
        assert_eq!(format!("{id:?}"), "TermId(GO:0008150)");
        assert!(id == "GO:0008150");
    }
}
