//! Error types for corpus builds
//!
//! Per-card problems (schema, validation, decode) are counted by the stages
//! and never surface here. These errors end the whole run.

use std::path::PathBuf;
use thiserror::Error;

use crate::export::ExportError;
use crate::import::ImportError;
use crate::validation::RoundTripError;

/// Errors that can occur during a corpus build
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Build configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Stage execution failed with context
    #[error("Stage '{stage}' failed: {message}")]
    StageError { stage: String, message: String },

    /// Stage failed with underlying cause
    #[error("Stage '{stage}' failed")]
    StageFailure {
        stage: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Missing required input
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// Manifest read or write failed
    #[error("Manifest error: {0}")]
    ManifestError(String),

    /// IO error with path context
    #[error("IO error with {path}: {message}")]
    IoErrorWithPath {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Database import error (wrapped)
    #[error("Import error: {0}")]
    ImportError(String),

    /// Corpus or dump write error (wrapped)
    #[error("Export error: {0}")]
    ExportError(String),

    /// Encoder and decoder disagree
    #[error("Round-trip verification failed: {0}")]
    RoundTrip(#[from] RoundTripError),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Create a stage error with message
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageError {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a stage failure with underlying error
    pub fn stage_failure<E>(stage: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StageFailure {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// Create an IO error with path context
    pub fn io_with_path(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::IoErrorWithPath {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Get the stage name if this is a stage error
    pub fn stage_name(&self) -> Option<&str> {
        match self {
            PipelineError::StageError { stage, .. } => Some(stage),
            PipelineError::StageFailure { stage, .. } => Some(stage),
            PipelineError::RoundTrip(_) => Some("verify"),
            _ => None,
        }
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::ConfigError(msg) => {
                format!("Configuration error: {msg}\n\nHint: Check your build configuration file.")
            }
            PipelineError::StageError { stage, message } => {
                format!("Stage '{stage}' failed: {message}")
            }
            PipelineError::StageFailure { stage, source } => {
                format!("Stage '{stage}' failed: {source}")
            }
            PipelineError::MissingInput(input) => {
                format!(
                    "Missing required input: {input}\n\nHint: Pass the card database with --input."
                )
            }
            PipelineError::FileNotFound(path) => {
                format!(
                    "File not found: {}\n\nHint: Check that the file exists and the path is correct.",
                    path.display()
                )
            }
            PipelineError::ImportError(msg) => {
                format!(
                    "Import error: {msg}\n\nHint: The input must be an AllPrintings-style JSON document with a top-level 'data' object."
                )
            }
            PipelineError::RoundTrip(err) => {
                format!(
                    "Round-trip verification failed: {err}\n\nHint: The corpus was written but must not be used. Compare standardized.yaml with roundtripped.yaml in the output directory."
                )
            }
            _ => self.to_string(),
        }
    }
}

impl From<ImportError> for PipelineError {
    fn from(err: ImportError) -> Self {
        PipelineError::ImportError(err.to_string())
    }
}

impl From<ExportError> for PipelineError {
    fn from(err: ExportError) -> Self {
        PipelineError::ExportError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::RoundTripMismatch;

    #[test]
    fn test_error_display() {
        let err = PipelineError::stage("encode", "corpus directory is read-only");
        assert!(err.to_string().contains("encode"));
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_stage_failure() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = PipelineError::stage_failure("normalize", io_err);
        assert_eq!(err.stage_name(), Some("normalize"));
    }

    #[test]
    fn test_io_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = PipelineError::io_with_path("/out/corpus.txt", "writing corpus", io_err);
        let display = err.to_string();
        assert!(display.contains("/out/corpus.txt"));
        assert!(display.contains("writing corpus"));
    }

    #[test]
    fn test_round_trip_user_message() {
        let err = PipelineError::from(RoundTripError::Mismatch(RoundTripMismatch {
            index: 7,
            name: "Opt".to_string(),
            field: "rarity".to_string(),
            expected: "\"common\"".to_string(),
            actual: "\"rare\"".to_string(),
        }));
        assert_eq!(err.stage_name(), Some("verify"));
        let msg = err.user_message();
        assert!(msg.contains("card 7"));
        assert!(msg.contains("rarity"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_missing_input_hint() {
        let msg = PipelineError::MissingInput("card database".to_string()).user_message();
        assert!(msg.contains("--input"));
    }
}
