//! Loading Gene Ontology terms from an `obo` file
//!
//! Only `[Term]` stanzas are used. Per stanza, these tags are parsed:
//!
//! ```text
//! [Term]
//! id: GO:0006281
//! name: DNA repair
//! alt_id: GO:0000734
//! synonym: "DNA repair process" EXACT []
//! is_a: GO:0006259 ! DNA metabolic process
//! relationship: part_of GO:0006974 ! DNA damage response
//! ```
//!
//! Alternative identifiers become synonyms. Obsolete terms are skipped
//! entirely. Relation targets are the first token of the value, so trailing
//! `{qualifiers}` and `! comments` are ignored.
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::parser::open;
use crate::term::{OntologyLoader, RelationKind, Term};
use crate::{BurdenError, BurdenResult};

/// Relation kinds that become parent edges if not configured otherwise
pub const DEFAULT_RELATIONS: [RelationKind; 2] = [RelationKind::IsA, RelationKind::PartOf];

/// Reads [`Term`]s from an `obo` file
///
/// # Examples
///
/// ```
/// use goburden::parser::go_obo::OboLoader;
/// use goburden::term::RelationKind;
///
/// let obo = "\
/// [Term]
/// id: GO:1
/// name: root
///
/// [Term]
/// id: GO:2
/// name: child
/// is_a: GO:1 ! root
/// relationship: regulates GO:1 ! root
/// ";
///
/// let terms = OboLoader::new("go.obo").terms_from_str(obo).unwrap();
/// assert_eq!(terms.len(), 2);
/// assert_eq!(terms[1].relations().len(), 1);
///
/// let terms = OboLoader::new("go.obo")
///     .with_relations(vec![RelationKind::IsA, "regulates".parse().unwrap()])
///     .terms_from_str(obo)
///     .unwrap();
/// assert_eq!(terms[1].relations().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct OboLoader {
    path: PathBuf,
    relations: Vec<RelationKind>,
}

impl OboLoader {
    /// Constructs a loader for `path`, using [`DEFAULT_RELATIONS`]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            relations: DEFAULT_RELATIONS.to_vec(),
        }
    }

    /// Only relations of the given kinds become parent edges
    pub fn with_relations(mut self, relations: Vec<RelationKind>) -> Self {
        self.relations = relations;
        self
    }

    /// Parses all terms from the content of an `obo` file
    ///
    /// # Errors
    ///
    /// [`BurdenError::InvalidInput`] if a `[Term]` stanza has no `id`
    pub fn terms_from_str(&self, content: &str) -> BurdenResult<Vec<Term>> {
        let mut terms = Vec::new();
        let mut obsolete = 0usize;
        for stanza in stanzas(content) {
            if stanza.header != "[Term]" {
                trace!("Ignoring stanza {}", stanza.header);
                continue;
            }
            match self.term_from_stanza(&stanza)? {
                Some(term) => terms.push(term),
                None => obsolete += 1,
            }
        }
        debug!("Parsed {} terms, skipped {} obsolete", terms.len(), obsolete);
        Ok(terms)
    }

    /// Returns `None` for obsolete terms
    fn term_from_stanza(&self, stanza: &Stanza<'_>) -> BurdenResult<Option<Term>> {
        let mut id: Option<&str> = None;
        let mut name: Option<&str> = None;
        for (tag, value) in stanza.tags() {
            match tag {
                "id" => id = Some(value),
                "name" => name = Some(value),
                "is_obsolete" if value == "true" => {
                    trace!("Skipping obsolete term {}", id.unwrap_or("without id"));
                    return Ok(None);
                }
                _ => {}
            }
        }
        let Some(id) = id else {
            return Err(BurdenError::InvalidInput(format!(
                "[Term] stanza at line {} without id",
                stanza.lineno
            )));
        };

        let mut term = Term::new(id, name.unwrap_or(id));
        for (tag, value) in stanza.tags() {
            match tag {
                "alt_id" => term.add_synonym(value),
                "synonym" => {
                    if let Some(synonym) = quoted(value) {
                        term.add_synonym(&synonym);
                    }
                }
                "is_a" => {
                    let Some(target) = value.split_whitespace().next() else {
                        return Err(BurdenError::InvalidInput(format!("empty is_a of {id}")));
                    };
                    if self.relations.contains(&RelationKind::IsA) {
                        term.add_relation(target, RelationKind::IsA);
                    }
                }
                "relationship" => {
                    // KIND TARGET, optionally followed by {qualifiers} and ! comment
                    let mut tokens = value.split_whitespace();
                    let (Some(kind), Some(target)) = (tokens.next(), tokens.next()) else {
                        return Err(BurdenError::InvalidInput(format!(
                            "invalid relationship of {id}: {value}"
                        )));
                    };
                    let kind: RelationKind = kind.parse()?;
                    if self.relations.contains(&kind) {
                        term.add_relation(target, kind);
                    }
                }
                _ => {}
            }
        }
        Ok(Some(term))
    }
}

impl OntologyLoader for OboLoader {
    fn load(&self) -> BurdenResult<Vec<Term>> {
        let filename = self.path.display().to_string();
        let mut content = String::new();
        open(&self.path)?
            .read_to_string(&mut content)
            .map_err(|err| BurdenError::InvalidInput(format!("{filename}: {err}")))?;
        self.terms_from_str(&content)
    }
}

/// A block of `tag: value` lines below a `[Header]` line
struct Stanza<'a> {
    header: &'a str,
    lineno: usize,
    lines: Vec<&'a str>,
}

impl<'a> Stanza<'a> {
    fn tags(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.lines.iter().copied().filter_map(parse_line)
    }
}

/// Splits the file into stanzas. Lines before the first stanza (the
/// file header) are ignored
fn stanzas(content: &str) -> Vec<Stanza<'_>> {
    let mut stanzas: Vec<Stanza<'_>> = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim_end();
        if line.starts_with('[') {
            stanzas.push(Stanza {
                header: line,
                lineno: idx + 1,
                lines: Vec::new(),
            });
        } else if let Some(stanza) = stanzas.last_mut() {
            if !line.is_empty() {
                stanza.lines.push(line);
            }
        }
    }
    stanzas
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(':')
        .map(|(tag, value)| (tag.trim(), value.trim()))
}

/// Returns the unescaped text between the first pair of unescaped double quotes
fn quoted(value: &str) -> Option<String> {
    let rest = value.strip_prefix('"')?;
    let mut text = String::with_capacity(rest.len());
    let mut escaped = false;
    for c in rest.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(text),
            _ => {
                escaped = false;
                text.push(c);
            }
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;

    const OBO: &str = "format-version: 1.2
ontology: go

[Term]
id: GO:0000001
name: root
synonym: \"the \\\"top\\\" term\" EXACT []
synonym: \"origin\" RELATED [GOC:xyz]

[Term]
id: GO:0000002
name: child
alt_id: GO:0000099
is_a: GO:0000001 ! root
relationship: part_of GO:0000001 ! root
relationship: regulates GO:0000003 ! other

[Term]
id: GO:0000003
name: gone
is_obsolete: true

[Typedef]
id: part_of
name: part of
";

    #[test]
    fn split_stanzas() {
        let stanzas = stanzas(OBO);
        assert_eq!(stanzas.len(), 4);
        assert_eq!(stanzas[0].header, "[Term]");
        assert_eq!(stanzas[0].lineno, 4);
        assert_eq!(stanzas[3].header, "[Typedef]");
        assert_eq!(stanzas[1].lines.len(), 6);
    }

    #[test]
    fn parse_terms() {
        let terms = OboLoader::new("go.obo").terms_from_str(OBO).unwrap();
        assert_eq!(terms.len(), 2);

        let root = &terms[0];
        assert_eq!(root.id(), "GO:0000001");
        assert_eq!(root.name(), "root");
        assert_eq!(
            root.synonyms(),
            &["the \"top\" term".to_string(), "origin".to_string()]
        );
        assert!(!root.has_relations());

        let child = &terms[1];
        assert_eq!(child.synonyms(), &["GO:0000099".to_string()]);
        let kinds: Vec<&RelationKind> = child.relations().iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, [&RelationKind::IsA, &RelationKind::PartOf]);
        assert!(child.relations().iter().all(|r| r.target() == "GO:0000001"));
    }

    #[test]
    fn only_configured_relations() {
        let terms = OboLoader::new("go.obo")
            .with_relations(vec![RelationKind::PartOf])
            .terms_from_str(OBO)
            .unwrap();
        assert_eq!(terms[1].relations().len(), 1);
        assert_eq!(terms[1].relations()[0].kind(), &RelationKind::PartOf);
    }

    #[test]
    fn term_without_id() {
        let res = OboLoader::new("go.obo").terms_from_str("[Term]\nname: nameless\n");
        assert!(matches!(res, Err(BurdenError::InvalidInput(_))));
    }

    #[test]
    fn term_without_name_uses_id() {
        let terms = OboLoader::new("go.obo")
            .terms_from_str("[Term]\nid: GO:7\n")
            .unwrap();
        assert_eq!(terms[0].name(), "GO:7");
    }

    #[test]
    fn malformed_relationship() {
        let res = OboLoader::new("go.obo")
            .terms_from_str("[Term]\nid: GO:7\nrelationship: part_of\n");
        assert!(matches!(res, Err(BurdenError::InvalidInput(_))));
    }

    #[test]
    fn missing_file() {
        let res = OboLoader::new("/does/not/exist.obo").load();
        assert_eq!(
            res.unwrap_err(),
            BurdenError::CannotOpenFile("/does/not/exist.obo".to_string())
        );
    }

    #[test]
    fn quoted_text() {
        assert_eq!(quoted("\"foo bar\" EXACT []").as_deref(), Some("foo bar"));
        assert_eq!(quoted("\"\" EXACT []").as_deref(), Some(""));
        assert_eq!(quoted(r#""a \"b\" c\\d" EXACT []"#).as_deref(), Some(r#"a "b" c\d"#));
        assert_eq!(quoted("foo"), None);
        assert_eq!(quoted("\"unterminated"), None);
    }

    #[test]
    fn relation_qualifiers_and_comments() {
        let obo = "[Term]
id: GO:1
name: root

[Term]
id: GO:2
name: child
is_a: GO:1 {source=\"GOC:x\"} ! root
relationship: part_of GO:1 {source=\"GOC:y\"} ! root
";
        let terms = OboLoader::new("go.obo").terms_from_str(obo).unwrap();
        assert_eq!(terms[1].relations().len(), 2);
        assert!(terms[1].relations().iter().all(|r| r.target() == "GO:1"));

        let dag = crate::DagBuilder::build(terms).unwrap();
        assert_eq!(dag.len(), 2);
    }

    #[test]
    fn synonyms_are_unescaped() {
        let obo = "[Term]\nid: GO:1\nname: root\nsynonym: \"the \\\"top\\\" term\" EXACT []\n";
        let terms = OboLoader::new("go.obo").terms_from_str(obo).unwrap();
        let dag = crate::DagBuilder::build(terms).unwrap();
        assert_eq!(dag.term_by_name("the \"top\" term").map(|t| t.id().as_str()), Some("GO:1"));
    }
}
