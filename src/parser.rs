//! Parsers for the input files of a burden analysis
//!
//! Each parser implements one of the collaborator traits of the engine, so
//! the engine itself never deals with a specific file format. Every file
//! input may be gzip compressed (`.gz`).
//!
//! | Input                     | Parser                              | Trait                                  |
//! |---------------------------|-------------------------------------|----------------------------------------|
//! | `go.obo`                  | [`go_obo::OboLoader`]               | [`crate::term::OntologyLoader`]        |
//! | gene to GO terms          | [`gene_association::parse`]         |                                        |
//! | pedigree (`.ped`)         | [`pedigree::Pedigree`]              | [`crate::cohort::CohortSource`]        |
//! | VCF `##Sample` lines      | [`vcf::VcfHeader`]                  | [`crate::cohort::CohortSource`]        |
//! | variants (`.vcf`, `.vcf.gz`) | [`vcf::VcfReader`]                  | [`crate::variant::VariantRecordSource`] |
//! | VEP / SnpEff predictions  | [`vcf::Annotations`]                | [`crate::variant::EffectAnnotationSource`] |
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::{BurdenError, BurdenResult};

pub mod gene_association;
pub mod go_obo;
pub mod pedigree;
pub mod vcf;

/// Opens `file` for buffered reading
///
/// Files ending in `.gz` are decompressed on the fly. Multi-member streams,
/// as written by `bgzip`, are read completely.
///
/// # Errors
///
/// [`BurdenError::CannotOpenFile`] if the file is missing or unreadable
pub(crate) fn open<P: AsRef<Path>>(file: P) -> BurdenResult<Box<dyn BufRead>> {
    let path = file.as_ref();
    let filename = path.display().to_string();
    let file = File::open(path).map_err(|_| BurdenError::CannotOpenFile(filename))?;
    let gzipped = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(file)))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Builds the error for line `lineno` (1-based) of `source`
pub(crate) fn invalid_line(source: &str, lineno: usize, reason: &str) -> BurdenError {
    BurdenError::InvalidInput(format!("{source} line {lineno}: {reason}"))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn temp_file(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("goburden-parser-{}-{}", std::process::id(), name))
    }

    #[test]
    fn open_gzipped() {
        let path = temp_file("lines.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"first\nsecond\n").unwrap();
        encoder.finish().unwrap();

        let lines: Vec<String> = open(&path).unwrap().lines().map(|l| l.unwrap()).collect();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(lines, ["first", "second"]);
    }

    #[test]
    fn open_plain() {
        let path = temp_file("lines.txt");
        std::fs::write(&path, "first\n").unwrap();
        let lines: Vec<String> = open(&path).unwrap().lines().map(|l| l.unwrap()).collect();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(lines, ["first"]);
    }

    #[test]
    fn open_missing() {
        assert_eq!(
            open("/does/not/exist.gz").err(),
            Some(BurdenError::CannotOpenFile("/does/not/exist.gz".to_string()))
        );
    }
}
