//! Command line interface of `goburden`
//!
//! Reads a VCF (file or stdin) annotated with VEP or SnpEff predictions and
//! writes the ranked GO term burden report (file or stdout).
//!
//! ```text
//! goburden --go go.obo -G genes.tsv -p cohort.ped variants.vcf.gz > report.tsv
//! ```
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use goburden::config::Config;
use goburden::engine;
use goburden::report::RankOrder;
use goburden::term::RelationKind;

/// Case/control variant burden enrichment over Gene Ontology terms
#[derive(Parser)]
#[command(name = "goburden", version, about)]
struct Cli {
    /// VCF file. Reads from stdin if omitted
    vcf: Option<PathBuf>,

    /// Gene Ontology in obo format
    #[arg(long = "go")]
    ontology: PathBuf,

    /// Gene to GO term associations (gene<TAB>term)
    #[arg(short = 'G', long)]
    genes: PathBuf,

    /// Pedigree with the affection status of the samples. Uses the
    /// `##Sample` lines of the VCF header if omitted
    #[arg(short, long)]
    pedigree: Option<PathBuf>,

    /// Report file. Writes to stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ranking direction: ascending (most significant first) or descending
    #[arg(long, default_value = "ascending")]
    order: RankOrder,

    /// Ontology relation used as parent edge, can be repeated [default: is_a, part_of]
    #[arg(long = "relation")]
    relations: Vec<RelationKind>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(self) -> Config {
        let mut config = Config::new(self.ontology, self.genes)
            .with_order(self.order)
            .with_relations(self.relations);
        if let Some(pedigree) = self.pedigree {
            config = config.with_pedigree(pedigree);
        }
        if let Some(vcf) = self.vcf {
            config = config.with_vcf(vcf);
        }
        if let Some(output) = self.output {
            config = config.with_output(output);
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = engine::run(&cli.config()) {
        error!("{}", err);
        process::exit(1);
    }
}
