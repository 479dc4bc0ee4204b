//! Export functionality
//!
//! Provides writers for the build outputs:
//! - The flat training corpus (one encoded card per line)
//! - YAML dumps of the dataset at each pipeline stage, for manual review

pub mod corpus;
pub mod yaml;

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl ExportError {
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        ExportError::IoError(format!("{}: {err}", path.display()))
    }
}

pub use corpus::{CorpusSummary, corpus_alphabet, render_corpus, sha256_hex, write_corpus};
pub use yaml::{dump_yaml, to_yaml_string};
