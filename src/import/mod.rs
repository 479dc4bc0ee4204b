//! Import functionality
//!
//! Provides the card database importer:
//! - MTGJSON `AllPrintings.json` dumps (sets -> cards -> optional faces)

pub mod mtgjson;

/// Error during import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

pub use mtgjson::{
    CardFailure, MtgJsonImporter, NormalizeOptions, NormalizeResult, RawCard, RawDatabase, RawSet,
    SchemaError,
};
