//! Scanning variants and accumulating their counts on the DAG
//!
//! [`BurdenEngine`] owns all state of one analysis: the [`EnrichmentDag`],
//! the [`GeneIndex`], the [`Cohort`] and the [`Propagator`]. Per variant it
//!
//! 1. collects the genes of the effect predictions
//! 2. looks up the nodes of those genes
//! 3. classifies the genotypes of the cohort into [`AlleleCounts`]
//! 4. propagates the counts to the nodes and all their ancestors
//!
//! [`run`] wires the parsers, the engine and the report writer together.
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;

use tracing::{debug, info};

use crate::cohort::{Cohort, CohortSource};
use crate::config::Config;
use crate::genes::GeneIndex;
use crate::ontology::{DagBuilder, EnrichmentDag, NodeGroup};
use crate::parser::gene_association;
use crate::parser::go_obo::OboLoader;
use crate::parser::pedigree::Pedigree;
use crate::parser::vcf::{Annotations, VcfReader};
use crate::propagation::Propagator;
use crate::report::{rank, write_report, RankOrder, ReportRow};
use crate::term::OntologyLoader;
use crate::variant::{AlleleCounts, EffectAnnotationSource, Variant, VariantRecordSource};
use crate::{BurdenError, BurdenResult, PROGRESS_INTERVAL};

/// Counters of a variant scan
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Number of variant records
    pub seen: u64,
    /// Number of variants that hit at least one node
    pub propagated: u64,
}

/// Accumulates the case/control counts of variants on the enrichment DAG
pub struct BurdenEngine {
    dag: EnrichmentDag,
    genes: GeneIndex,
    cohort: Cohort,
    propagator: Propagator,
    stats: ScanStats,
    hits: NodeGroup,
    gene_buffer: HashSet<String>,
}

impl BurdenEngine {
    /// Constructs a new engine, all nodes start without observations
    pub fn new(dag: EnrichmentDag, genes: GeneIndex, cohort: Cohort) -> Self {
        let propagator = Propagator::new(dag.len());
        Self {
            dag,
            genes,
            cohort,
            propagator,
            stats: ScanStats::default(),
            hits: NodeGroup::new(),
            gene_buffer: HashSet::new(),
        }
    }

    /// Adds the counts of `variant` to the nodes of `genes` and their ancestors
    ///
    /// Returns `false` without classifying the genotypes if none of the
    /// `genes` is annotated to any node.
    pub fn process_genes<I, S>(&mut self, variant: &Variant, genes: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.hits.clear();
        if !self.genes.collect_nodes(genes, &mut self.hits) {
            return false;
        }
        let counts = AlleleCounts::classify(&self.cohort, variant);
        let updated = self
            .propagator
            .propagate(&mut self.dag, self.hits.iter(), &counts);
        debug!("{}: {:?} on {} nodes", variant, counts, updated);
        true
    }

    /// Adds the counts of `variant` to the nodes of its predicted genes
    ///
    /// Returns `false` if the variant does not hit any node.
    pub fn process<A: EffectAnnotationSource>(&mut self, variant: &Variant, annotations: &A) -> bool {
        let mut genes = std::mem::take(&mut self.gene_buffer);
        genes.clear();
        annotations.genes(variant, &mut genes);
        let hit = !genes.is_empty() && self.process_genes(variant, &genes);
        self.gene_buffer = genes;
        hit
    }

    /// Processes all variants of `source`
    ///
    /// # Errors
    ///
    /// Stops at the first invalid record and returns its error
    pub fn scan<I, A>(&mut self, source: I, annotations: &A) -> BurdenResult<&ScanStats>
    where
        I: IntoIterator<Item = BurdenResult<Variant>>,
        A: EffectAnnotationSource,
    {
        for variant in source {
            let variant = variant?;
            self.stats.seen += 1;
            if self.process(&variant, annotations) {
                self.stats.propagated += 1;
            }
            if self.stats.seen % PROGRESS_INTERVAL == 0 {
                info!(
                    "Processed {} variants, last {}, {} with GO annotations",
                    self.stats.seen, variant, self.stats.propagated
                );
            }
        }
        info!(
            "Scan finished: {} variants, {} with GO annotations",
            self.stats.seen, self.stats.propagated
        );
        Ok(&self.stats)
    }

    /// Ranks all nodes with at least one observation
    pub fn rank(&self, order: RankOrder) -> Vec<ReportRow> {
        rank(&self.dag, order)
    }

    /// The DAG with the accumulated counts
    pub fn dag(&self) -> &EnrichmentDag {
        &self.dag
    }

    /// The counters of all scans so far
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}

/// Runs a complete analysis as described by `config`
///
/// Returns the number of reported terms.
///
/// # Errors
///
/// Any [`BurdenError`] of the input parsers, the cohort validation or of
/// writing the report. No report is written if an input is invalid.
pub fn run(config: &Config) -> BurdenResult<usize> {
    config.validate()?;

    let terms = OboLoader::new(config.ontology())
        .with_relations(config.relations().to_vec())
        .load()?;
    info!("Loaded {} terms from {}", terms.len(), config.ontology().display());
    let dag = DagBuilder::build(terms)?;

    let genes = gene_association::parse(config.genes(), &dag)?;

    let variants = match config.vcf() {
        Some(path) => VcfReader::open(path)?,
        None => VcfReader::stdin()?,
    };
    let persons = match config.pedigree() {
        Some(path) => Pedigree::parse(path)?.extract(variants.samples())?,
        None => {
            info!("Reading the affection status from the VCF header");
            variants.header().extract(variants.samples())?
        }
    };
    let cohort = Cohort::try_from(persons)?;
    let annotations = Annotations::from_header(variants.header());

    let mut engine = BurdenEngine::new(dag, genes, cohort);
    engine.scan(variants, &annotations)?;

    let rows = engine.rank(config.order());
    match config.output() {
        Some(path) => {
            let file = File::create(path)
                .map_err(|_| BurdenError::CannotOpenFile(path.display().to_string()))?;
            write_report(&rows, &mut BufWriter::new(file))?;
        }
        None => write_report(&rows, &mut std::io::stdout().lock())?,
    }
    info!("Reported {} terms", rows.len());
    Ok(rows.len())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cohort::{Person, Status};
    use crate::term::RelationKind;
    use crate::variant::Genotype;
    use crate::{NodeId, Term};

    fn engine() -> BurdenEngine {
        let root = Term::new("GO:1", "root");
        let mut child = Term::new("GO:2", "child");
        child.add_relation("GO:1", RelationKind::IsA);
        let dag = DagBuilder::build(vec![root, child]).unwrap();

        let mut genes = GeneIndex::default();
        genes.add_association(&dag, "G1", "child").unwrap();

        let cohort = Cohort::try_from(vec![
            Person::new("case1", Status::Affected),
            Person::new("case2", Status::Affected),
            Person::new("ctrl1", Status::Unaffected),
            Person::new("ctrl2", Status::Unaffected),
        ])
        .unwrap();
        BurdenEngine::new(dag, genes, cohort)
    }

    fn variant(genotypes: [&str; 4]) -> Variant {
        let mut variant = Variant::new("chr1", 1, "A", vec!["T".to_string()]);
        for (sample, gt) in ["case1", "case2", "ctrl1", "ctrl2"].iter().zip(genotypes) {
            variant.set_genotype(sample, Genotype::try_from(gt).unwrap());
        }
        variant
    }

    fn counts(engine: &BurdenEngine, id: &str) -> AlleleCounts {
        let node: NodeId = engine.dag().node_id(&id.into()).unwrap();
        *engine.dag().get(node).unwrap().counts()
    }

    #[test]
    fn child_and_root_accumulate() {
        let mut engine = engine();
        assert!(engine.process_genes(&variant(["0/1", "0/1", "0/0", "0/0"]), ["G1"]));

        let expected = AlleleCounts::new(2, 0, 0, 2);
        assert_eq!(counts(&engine, "GO:2"), expected);
        assert_eq!(counts(&engine, "GO:1"), expected);

        let rows = engine.rank(RankOrder::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].score(), rows[1].score());
        assert!(rows[0].score() < 1.0);
    }

    #[test]
    fn unknown_genes_short_circuit() {
        let mut engine = engine();
        assert!(!engine.process_genes(&variant(["1/1", "1/1", "0/0", "0/0"]), ["G2"]));
        assert!(!engine.process_genes(&variant(["1/1", "1/1", "0/0", "0/0"]), Vec::<String>::new()));
        assert!(engine.rank(RankOrder::default()).is_empty());
    }

    #[test]
    fn process_with_annotations() {
        let mut engine = engine();
        let annotate = |variant: &Variant, genes: &mut HashSet<String>| {
            if variant.position() == 1 {
                genes.insert("G1".to_string());
            }
        };
        assert!(engine.process(&variant(["0/1", "./.", "0/0", "0/1"]), &annotate));
        assert_eq!(counts(&engine, "GO:1"), AlleleCounts::new(1, 1, 0, 1));

        let elsewhere = Variant::new("chr1", 2, "A", vec!["T".to_string()]);
        assert!(!engine.process(&elsewhere, &annotate));
    }

    #[test]
    fn scan_counts_and_stops_on_error() {
        let mut engine = engine();
        let annotate = |_: &Variant, genes: &mut HashSet<String>| {
            genes.insert("G1".to_string());
        };
        let variants = vec![
            Ok(variant(["0/1", "0/0", "0/0", "0/0"])),
            Ok(variant(["0/0", "0/0", "0/0", "1/1"])),
        ];
        let stats = *engine.scan(variants, &annotate).unwrap();
        assert_eq!(stats, ScanStats { seen: 2, propagated: 2 });
        assert_eq!(counts(&engine, "GO:2"), AlleleCounts::new(3, 1, 3, 1));

        let variants = vec![
            Ok(variant(["0/1", "0/0", "0/0", "0/0"])),
            Err(BurdenError::InvalidInput("broken".to_string())),
            Ok(variant(["0/1", "0/0", "0/0", "0/0"])),
        ];
        assert!(engine.scan(variants, &annotate).is_err());
        assert_eq!(engine.stats().seen, 3);
    }
}
