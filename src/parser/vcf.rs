//! Reading variants and their effect predictions from VCF
//!
//! [`VcfReader`] parses the header and then yields one [`Variant`] per
//! record, with the `GT` genotype of every sample and the raw `INFO` values.
//!
//! The header may carry the affection status of the samples as
//! `##Sample=<ID=case1,Family=F1,Father=0,Mother=0,Sex=1,Status=2>` lines.
//! [`VcfHeader`] is then a [`CohortSource`] of its own, used when no
//! pedigree file is given. `Status` is `2` or `affected` for cases and `1`
//! or `unaffected` for controls.
//!
//! The genes of a variant are taken from the effect predictions of
//! [VEP](https://www.ensembl.org/vep) (`CSQ`) and
//! [SnpEff](https://pcingola.github.io/SnpEff/) (`ANN`), see [`Annotations`].
use std::collections::HashSet;
use std::io::{BufRead, Lines};
use std::path::Path;

use tracing::debug;

use crate::cohort::{CohortSource, Person, Status};
use crate::parser::pedigree::{phenotype, Pedigree};
use crate::parser::{invalid_line, open};
use crate::variant::{EffectAnnotationSource, Genotype, Variant, VariantRecordSource};
use crate::{BurdenError, BurdenResult};

/// `INFO` key of VEP predictions
pub const VEP_TAG: &str = "CSQ";
/// `INFO` key of SnpEff predictions
pub const SNPEFF_TAG: &str = "ANN";

/// VEP columns that can contain a gene symbol or gene/transcript identifier
pub const VEP_GENE_COLUMNS: [&str; 8] = [
    "CCDS", "Feature", "ENSP", "Gene", "HGNC", "HGNC_ID", "SYMBOL", "RefSeq",
];

/// Position of the gene name in a SnpEff `ANN` prediction
const SNPEFF_GENE_NAME: usize = 3;

/// Minimum number of columns of a record (`CHROM` to `INFO`)
const FIXED_COLUMNS: usize = 8;

/// The information of the VCF header that is needed to parse the records
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VcfHeader {
    samples: Vec<String>,
    csq_columns: Vec<String>,
    pedigree: Pedigree,
}

impl VcfHeader {
    /// Names of all samples, in column order
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Columns of the VEP `CSQ` predictions, empty if not declared
    pub fn csq_columns(&self) -> &[String] {
        &self.csq_columns
    }

    /// Samples with known affection status from `##Sample` lines
    pub fn pedigree(&self) -> &Pedigree {
        &self.pedigree
    }

    fn parse_meta_line(&mut self, line: &str) -> Result<(), String> {
        if let Some(sample) = line.strip_prefix("##Sample=<") {
            return self.parse_sample_line(sample.trim_end_matches('>'));
        }
        if let Some(info) = line.strip_prefix("##INFO=<") {
            self.parse_csq_line(info);
        }
        Ok(())
    }

    /// Parses `ID=CSQ,...,Description="... Format: A|B|C">`
    fn parse_csq_line(&mut self, info: &str) {
        if !info.starts_with(&format!("ID={VEP_TAG},")) {
            return;
        }
        let Some((_, format)) = info.split_once("Format: ") else {
            return;
        };
        let format = format.trim_end_matches('>').trim_end_matches('"');
        self.csq_columns = format.split('|').map(|col| col.trim().to_string()).collect();
        debug!("VEP columns: {}", self.csq_columns.join(", "));
    }

    /// Parses `ID=S1,Family=F1,...,Status=2`
    fn parse_sample_line(&mut self, fields: &str) -> Result<(), String> {
        let mut id = None;
        let mut status = None;
        for (key, value) in fields.split(',').filter_map(|field| field.split_once('=')) {
            match key.trim() {
                "ID" => id = Some(value.trim()),
                "Status" => status = Some(value.trim()),
                _ => {}
            }
        }
        let Some(id) = id else {
            return Err("##Sample line without ID".to_string());
        };
        let known = status.and_then(|status| match status.to_ascii_lowercase().as_str() {
            "affected" => Some(Status::Affected),
            "unaffected" => Some(Status::Unaffected),
            code => phenotype(code),
        });
        match known {
            Some(status) => self.pedigree.insert(id, status),
            None => {
                debug!("Ignoring sample {} with status {:?}", id, status);
                Ok(())
            }
        }
    }
}

/// Iterates the records of a VCF file
///
/// # Examples
///
/// ```
/// use goburden::parser::vcf::VcfReader;
/// use goburden::variant::{AlleleStatus, VariantRecordSource};
///
/// let vcf = "##fileformat=VCFv4.2
/// #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2
/// chr1\t100\t.\tA\tT\t.\tPASS\tDP=10\tGT:DP\t0/1:5\t./.:0
/// ";
///
/// let mut reader = VcfReader::new(vcf.as_bytes(), "test.vcf").unwrap();
/// assert_eq!(reader.samples(), &["S1".to_string(), "S2".to_string()]);
///
/// let variant = reader.next().unwrap().unwrap();
/// assert_eq!(variant.to_string(), "chr1:100 A>T");
/// assert_eq!(variant.info("DP"), Some("10"));
/// assert_eq!(variant.genotype("S1").unwrap().status(), Some(AlleleStatus::Alt));
/// assert_eq!(variant.genotype("S2").unwrap().status(), None);
///
/// assert!(reader.next().is_none());
/// ```
pub struct VcfReader<R> {
    lines: Lines<R>,
    source: String,
    lineno: usize,
    header: VcfHeader,
}

impl<R: BufRead> VcfReader<R> {
    /// Reads the header from `reader`. `source` is only used in error messages
    ///
    /// # Errors
    ///
    /// [`BurdenError::InvalidInput`] if the `#CHROM` line is missing
    pub fn new(reader: R, source: &str) -> BurdenResult<Self> {
        let mut lines = reader.lines();
        let mut lineno = 0usize;
        let mut header = VcfHeader::default();
        loop {
            let Some(line) = lines.next() else {
                return Err(BurdenError::InvalidInput(format!(
                    "{source}: missing #CHROM header line"
                )));
            };
            lineno += 1;
            let line = line.map_err(|err| invalid_line(source, lineno, &err.to_string()))?;
            if line.starts_with("##") {
                header
                    .parse_meta_line(&line)
                    .map_err(|reason| invalid_line(source, lineno, &reason))?;
            } else if line.starts_with("#CHROM") {
                header.samples = line
                    .split('\t')
                    .skip(FIXED_COLUMNS + 1)
                    .map(str::to_string)
                    .collect();
                break;
            } else {
                return Err(invalid_line(source, lineno, "missing #CHROM header line"));
            }
        }
        debug!("{} samples in {}", header.samples.len(), source);
        Ok(Self {
            lines,
            source: source.to_string(),
            lineno,
            header,
        })
    }

    /// The parsed header
    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    fn parse_record(&self, line: &str) -> BurdenResult<Variant> {
        let invalid = |reason: &str| invalid_line(&self.source, self.lineno, reason);

        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < FIXED_COLUMNS {
            return Err(invalid("expected at least 8 columns"));
        }
        let position: u64 = cols[1].parse().map_err(|_| invalid("invalid position"))?;
        let alternates = match cols[4] {
            "." => Vec::new(),
            alts => alts.split(',').map(str::to_string).collect(),
        };
        let mut variant = Variant::new(cols[0], position, cols[3], alternates);

        if cols[7] != "." {
            for entry in cols[7].split(';').filter(|entry| !entry.is_empty()) {
                match entry.split_once('=') {
                    Some((key, value)) => variant.set_info(key, value),
                    None => variant.set_info(entry, ""),
                }
            }
        }

        let samples = self.header.samples();
        if samples.is_empty() {
            return Ok(variant);
        }
        if cols.len() != FIXED_COLUMNS + 1 + samples.len() {
            return Err(invalid(&format!(
                "expected {} columns, found {}",
                FIXED_COLUMNS + 1 + samples.len(),
                cols.len()
            )));
        }
        let Some(gt_index) = cols[FIXED_COLUMNS].split(':').position(|key| key == "GT") else {
            return Ok(variant);
        };
        for (sample, data) in samples.iter().zip(&cols[FIXED_COLUMNS + 1..]) {
            // trailing fields may be dropped, a missing GT is a no-call
            let gt = data.split(':').nth(gt_index).unwrap_or(".");
            let genotype =
                Genotype::try_from(gt).map_err(|_| invalid(&format!("invalid genotype {gt}")))?;
            variant.set_genotype(sample, genotype);
        }
        Ok(variant)
    }
}

impl CohortSource for VcfHeader {
    fn extract(&self, samples: &[String]) -> BurdenResult<Vec<Person>> {
        self.pedigree.extract(samples)
    }
}

impl VcfReader<Box<dyn BufRead>> {
    /// Opens the VCF file `file`, which may be gzip compressed
    ///
    /// # Errors
    ///
    /// - [`BurdenError::CannotOpenFile`] if `file` is missing
    /// - see [`VcfReader::new`]
    pub fn open<P: AsRef<Path>>(file: P) -> BurdenResult<Self> {
        let source = file.as_ref().display().to_string();
        Self::new(open(file)?, &source)
    }

    /// Reads the VCF from standard input
    ///
    /// # Errors
    ///
    /// see [`VcfReader::new`]
    pub fn stdin() -> BurdenResult<Self> {
        let reader: Box<dyn BufRead> = Box::new(std::io::stdin().lock());
        Self::new(reader, "<stdin>")
    }
}

impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = BurdenResult<Variant>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.lineno += 1;
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    return Some(Err(invalid_line(&self.source, self.lineno, &err.to_string())))
                }
            };
            if !line.trim().is_empty() {
                return Some(self.parse_record(&line));
            }
        }
    }
}

impl<R: BufRead> VariantRecordSource for VcfReader<R> {
    fn samples(&self) -> &[String] {
        self.header.samples()
    }
}

/// Genes from VEP `CSQ` predictions
///
/// Every non-blank value of the [`VEP_GENE_COLUMNS`] counts as gene, so
/// the association file may use symbols, Ensembl or RefSeq identifiers.
#[derive(Clone, Debug, Default)]
pub struct VepAnnotation {
    columns: Vec<usize>,
}

impl VepAnnotation {
    /// Constructs the parser for the `CSQ` layout `csq_columns`
    pub fn new(csq_columns: &[String]) -> Self {
        let columns = csq_columns
            .iter()
            .enumerate()
            .filter(|(_, name)| VEP_GENE_COLUMNS.contains(&name.as_str()))
            .map(|(idx, _)| idx)
            .collect();
        Self { columns }
    }
}

impl EffectAnnotationSource for VepAnnotation {
    fn genes(&self, variant: &Variant, genes: &mut HashSet<String>) {
        let Some(csq) = variant.info(VEP_TAG) else {
            return;
        };
        for prediction in csq.split(',') {
            let fields: Vec<&str> = prediction.split('|').collect();
            for idx in &self.columns {
                if let Some(gene) = fields.get(*idx).map(|field| field.trim()) {
                    if !gene.is_empty() {
                        genes.insert(gene.to_string());
                    }
                }
            }
        }
    }
}

/// Gene names from SnpEff `ANN` predictions
#[derive(Clone, Copy, Debug, Default)]
pub struct SnpEffAnnotation;

impl EffectAnnotationSource for SnpEffAnnotation {
    fn genes(&self, variant: &Variant, genes: &mut HashSet<String>) {
        let Some(ann) = variant.info(SNPEFF_TAG) else {
            return;
        };
        for prediction in ann.split(',') {
            if let Some(gene) = prediction.split('|').nth(SNPEFF_GENE_NAME).map(str::trim) {
                if !gene.is_empty() {
                    genes.insert(gene.to_string());
                }
            }
        }
    }
}

/// The combined genes of VEP and SnpEff predictions
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use goburden::parser::vcf::{Annotations, VepAnnotation};
/// use goburden::variant::{EffectAnnotationSource, Variant};
///
/// let layout: Vec<String> = ["Allele", "Consequence", "SYMBOL"].iter().map(|s| s.to_string()).collect();
/// let annotations = Annotations::new(VepAnnotation::new(&layout));
///
/// let mut variant = Variant::new("chr1", 1, "A", vec!["T".into()]);
/// variant.set_info("CSQ", "T|missense_variant|BRCA1,T|intron_variant|");
/// variant.set_info("ANN", "T|missense_variant|MODERATE|NBR2|ENSG00000198496|transcript");
///
/// let mut genes = HashSet::new();
/// annotations.genes(&variant, &mut genes);
/// assert_eq!(genes.len(), 2);
/// assert!(genes.contains("BRCA1") && genes.contains("NBR2"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Annotations {
    vep: VepAnnotation,
    snpeff: SnpEffAnnotation,
}

impl Annotations {
    /// Combines `vep` with SnpEff predictions
    pub fn new(vep: VepAnnotation) -> Self {
        Self {
            vep,
            snpeff: SnpEffAnnotation,
        }
    }

    /// Uses the `CSQ` layout declared in `header`
    pub fn from_header(header: &VcfHeader) -> Self {
        Self::new(VepAnnotation::new(header.csq_columns()))
    }
}

impl EffectAnnotationSource for Annotations {
    fn genes(&self, variant: &Variant, genes: &mut HashSet<String>) {
        self.vep.genes(variant, genes);
        self.snpeff.genes(variant, genes);
    }
}
