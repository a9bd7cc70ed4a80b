use crate::core::formats::gro::GroError;
use crate::core::formats::ndx::NdxError;
use crate::core::formats::pdb::PdbError;
use crate::core::formats::xpm::XpmError;
use crate::core::formats::xvg::XvgError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure conditions of the analysis layer.
///
/// Format-level parse failures are wrapped; everything else falls into the
/// schema/range taxonomy that the invocation boundary reports as a single
/// line before terminating.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Input file not found or unreadable: {path}")]
    InputMissing { path: PathBuf },

    #[error("XVG error: {source}")]
    Xvg {
        #[from]
        source: XvgError,
    },

    #[error("XPM error: {source}")]
    Xpm {
        #[from]
        source: XpmError,
    },

    #[error("Index file error: {source}")]
    Ndx {
        #[from]
        source: NdxError,
    },

    #[error("GRO error: {source}")]
    Gro {
        #[from]
        source: GroError,
    },

    #[error("PDB error: {source}")]
    Pdb {
        #[from]
        source: PdbError,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid numeric token '{value}' on line {line}")]
    NumericParse { line: usize, value: String },

    #[error("Malformed reference table {path} at line {line}")]
    ReferenceTable { path: PathBuf, line: usize },
}
