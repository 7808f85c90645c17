//! Variants, genotypes and the case/control allele counts of a variant
//!
//! A [`Variant`] carries one [`Genotype`] per sample. Each genotype is
//! classified as reference-only, carrying a non-reference allele or not
//! called ([`Genotype::status`]), and [`AlleleCounts::classify`] tallies
//! the classified genotypes of all affected and unaffected individuals.
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::ops::{Add, AddAssign};

use smallvec::SmallVec;

use crate::cohort::Cohort;
use crate::{BurdenError, BurdenResult};

/// A single allele call of a genotype
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Allele {
    /// The reference allele (`0`)
    Reference,
    /// Any alternate allele, with its index in the `ALT` column (1-based)
    NonReference(u32),
    /// The allele was not called (`.`)
    NoCall,
}

/// Classification of a called genotype
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlleleStatus {
    /// Every allele is the reference allele
    Ref,
    /// At least one allele is a non-reference allele or not called
    Alt,
}

/// The genotype of one sample at one variant
///
/// # Examples
///
/// ```
/// use goburden::variant::{AlleleStatus, Genotype};
///
/// let het = Genotype::try_from("0/1").unwrap();
/// assert_eq!(het.status(), Some(AlleleStatus::Alt));
///
/// let hom_ref = Genotype::try_from("0|0").unwrap();
/// assert_eq!(hom_ref.status(), Some(AlleleStatus::Ref));
///
/// let missing = Genotype::try_from("./.").unwrap();
/// assert_eq!(missing.status(), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Genotype {
    alleles: SmallVec<[Allele; 2]>,
}

impl Genotype {
    /// Constructs a genotype from allele calls
    pub fn new<I: IntoIterator<Item = Allele>>(alleles: I) -> Self {
        Self {
            alleles: alleles.into_iter().collect(),
        }
    }

    /// The allele calls of the genotype
    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    /// Returns `true` if at least one allele was called
    pub fn is_called(&self) -> bool {
        self.alleles.iter().any(|allele| *allele != Allele::NoCall)
    }

    /// Classifies the genotype
    ///
    /// Returns `None` if no allele was called. A partially called genotype
    /// such as `./0` counts as [`AlleleStatus::Alt`].
    pub fn status(&self) -> Option<AlleleStatus> {
        if !self.is_called() {
            return None;
        }
        if self
            .alleles
            .iter()
            .any(|allele| *allele != Allele::Reference)
        {
            Some(AlleleStatus::Alt)
        } else {
            Some(AlleleStatus::Ref)
        }
    }
}

impl TryFrom<&str> for Genotype {
    type Error = BurdenError;
    /// Parses a VCF `GT` value, e.g. `0/1`, `1|1`, `./.` or `1`
    fn try_from(value: &str) -> BurdenResult<Self> {
        let mut alleles = SmallVec::new();
        for call in value.split(['/', '|']) {
            let allele = match call {
                "." => Allele::NoCall,
                "0" => Allele::Reference,
                idx => match idx.parse::<u32>() {
                    Ok(idx) => Allele::NonReference(idx),
                    Err(_) => {
                        return Err(BurdenError::InvalidInput(format!(
                            "invalid genotype {value}"
                        )))
                    }
                },
            };
            alleles.push(allele);
        }
        Ok(Self { alleles })
    }
}

/// The case/control allele counts of a variant or the accumulated counts of a node
///
/// "Unaffected" is the control role and "affected" the case role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AlleleCounts {
    /// Unaffected individuals with reference-only genotypes
    pub unaffected_ref: u64,
    /// Unaffected individuals carrying a non-reference allele
    pub unaffected_alt: u64,
    /// Affected individuals with reference-only genotypes
    pub affected_ref: u64,
    /// Affected individuals carrying a non-reference allele
    pub affected_alt: u64,
}

impl AlleleCounts {
    /// Constructs counts from the four values
    pub fn new(unaffected_ref: u64, unaffected_alt: u64, affected_ref: u64, affected_alt: u64) -> Self {
        Self {
            unaffected_ref,
            unaffected_alt,
            affected_ref,
            affected_alt,
        }
    }

    /// Counts the classified genotypes of all cohort members at `variant`
    ///
    /// Samples without genotype or with an uncalled genotype are not counted.
    pub fn classify(cohort: &Cohort, variant: &Variant) -> Self {
        let mut counts = Self::default();
        for sample in cohort.unaffected() {
            match variant.genotype(sample).and_then(Genotype::status) {
                Some(AlleleStatus::Ref) => counts.unaffected_ref += 1,
                Some(AlleleStatus::Alt) => counts.unaffected_alt += 1,
                None => {}
            }
        }
        for sample in cohort.affected() {
            match variant.genotype(sample).and_then(Genotype::status) {
                Some(AlleleStatus::Ref) => counts.affected_ref += 1,
                Some(AlleleStatus::Alt) => counts.affected_alt += 1,
                None => {}
            }
        }
        counts
    }

    /// The sum of all four counts
    pub fn total(&self) -> u64 {
        self.unaffected_ref + self.unaffected_alt + self.affected_ref + self.affected_alt
    }

    /// Returns `true` if all four counts are zero
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign for AlleleCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.unaffected_ref += rhs.unaffected_ref;
        self.unaffected_alt += rhs.unaffected_alt;
        self.affected_ref += rhs.affected_ref;
        self.affected_alt += rhs.affected_alt;
    }
}

impl Add for AlleleCounts {
    type Output = AlleleCounts;
    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

/// A single variant with per-sample genotypes and raw `INFO` annotations
#[derive(Clone, Debug, Default)]
pub struct Variant {
    contig: String,
    position: u64,
    reference: String,
    alternates: Vec<String>,
    genotypes: HashMap<String, Genotype>,
    info: HashMap<String, String>,
}

impl Variant {
    /// Constructs a variant without genotypes and annotations
    pub fn new(contig: &str, position: u64, reference: &str, alternates: Vec<String>) -> Self {
        Self {
            contig: contig.to_string(),
            position,
            reference: reference.to_string(),
            alternates,
            genotypes: HashMap::new(),
            info: HashMap::new(),
        }
    }

    /// The contig or chromosome name
    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// The 1-based position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The reference allele
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The alternate alleles
    pub fn alternates(&self) -> &[String] {
        &self.alternates
    }

    /// Returns the genotype of `sample`, if present
    pub fn genotype(&self, sample: &str) -> Option<&Genotype> {
        self.genotypes.get(sample)
    }

    /// Sets the genotype of `sample`
    pub fn set_genotype(&mut self, sample: &str, genotype: Genotype) {
        self.genotypes.insert(sample.to_string(), genotype);
    }

    /// Returns the raw `INFO` value of `key`. Flags have an empty value
    pub fn info(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }

    /// Sets the raw `INFO` value of `key`
    pub fn set_info(&mut self, key: &str, value: &str) {
        self.info.insert(key.to_string(), value.to_string());
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.contig,
            self.position,
            self.reference,
            self.alternates.join(",")
        )
    }
}

/// Produces variant records, e.g. from a VCF file
pub trait VariantRecordSource: Iterator<Item = BurdenResult<Variant>> {
    /// Names of all samples with genotypes in the records
    fn samples(&self) -> &[String];
}

/// Extracts the genes implicated by the effect predictions of a variant
pub trait EffectAnnotationSource {
    /// Adds every implicated gene symbol to `genes`
    fn genes(&self, variant: &Variant, genes: &mut HashSet<String>);
}

impl<F> EffectAnnotationSource for F
where
    F: Fn(&Variant, &mut HashSet<String>),
{
    fn genes(&self, variant: &Variant, genes: &mut HashSet<String>) {
        self(variant, genes)
    }
}
