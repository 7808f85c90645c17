//! Run parameters of a burden analysis
use std::path::{Path, PathBuf};

use crate::parser::go_obo::DEFAULT_RELATIONS;
use crate::report::RankOrder;
use crate::term::RelationKind;
use crate::{BurdenError, BurdenResult};

/// All parameters of one run of [`crate::engine::run`]
///
/// # Examples
///
/// ```
/// use goburden::config::Config;
/// use goburden::report::RankOrder;
///
/// let config = Config::new("go.obo", "genes.tsv")
///     .with_pedigree("cohort.ped")
///     .with_vcf("variants.vcf.gz")
///     .with_order(RankOrder::SourceOrder);
/// assert!(config.output().is_none());
/// assert_eq!(config.relations().len(), 2);
///
/// // the input files do not exist
/// assert!(config.validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    ontology: PathBuf,
    genes: PathBuf,
    pedigree: Option<PathBuf>,
    vcf: Option<PathBuf>,
    output: Option<PathBuf>,
    order: RankOrder,
    relations: Vec<RelationKind>,
}

impl Config {
    /// Constructs a config with the required inputs
    ///
    /// Variants are read from stdin, the affection status of the samples is
    /// taken from the VCF header and the report is written to stdout.
    pub fn new<P: AsRef<Path>>(ontology: P, genes: P) -> Self {
        Self {
            ontology: ontology.as_ref().to_path_buf(),
            genes: genes.as_ref().to_path_buf(),
            pedigree: None,
            vcf: None,
            output: None,
            order: RankOrder::default(),
            relations: DEFAULT_RELATIONS.to_vec(),
        }
    }

    /// Takes the affection status from the pedigree file `pedigree`
    /// instead of the VCF header
    pub fn with_pedigree<P: AsRef<Path>>(mut self, pedigree: P) -> Self {
        self.pedigree = Some(pedigree.as_ref().to_path_buf());
        self
    }

    /// Reads variants from `vcf` instead of stdin
    pub fn with_vcf<P: AsRef<Path>>(mut self, vcf: P) -> Self {
        self.vcf = Some(vcf.as_ref().to_path_buf());
        self
    }

    /// Writes the report to `output` instead of stdout
    pub fn with_output<P: AsRef<Path>>(mut self, output: P) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    /// Sets the direction of the ranking
    pub fn with_order(mut self, order: RankOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the ontology relations that become parent edges
    ///
    /// An empty list keeps the defaults.
    pub fn with_relations(mut self, relations: Vec<RelationKind>) -> Self {
        if !relations.is_empty() {
            self.relations = relations;
        }
        self
    }

    /// The `obo` file of the ontology
    pub fn ontology(&self) -> &Path {
        &self.ontology
    }

    /// The gene to GO term association file
    pub fn genes(&self) -> &Path {
        &self.genes
    }

    /// The pedigree file, `None` to use the VCF header
    pub fn pedigree(&self) -> Option<&Path> {
        self.pedigree.as_deref()
    }

    /// The VCF file, `None` for stdin
    pub fn vcf(&self) -> Option<&Path> {
        self.vcf.as_deref()
    }

    /// The report file, `None` for stdout
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn order(&self) -> RankOrder {
        self.order
    }

    pub fn relations(&self) -> &[RelationKind] {
        &self.relations
    }

    /// Checks that all input files exist
    ///
    /// # Errors
    ///
    /// [`BurdenError::CannotOpenFile`] for the first missing input
    pub fn validate(&self) -> BurdenResult<()> {
        let inputs = [
            Some(self.ontology.as_path()),
            Some(self.genes.as_path()),
            self.pedigree(),
            self.vcf(),
        ];
        for path in inputs.into_iter().flatten() {
            if !path.is_file() {
                return Err(BurdenError::CannotOpenFile(path.display().to_string()));
            }
        }
        Ok(())
    }
}
