//! CLI error types

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("{0}")]
    PipelineError(String),

    #[error("Output error: {0}")]
    OutputError(String),
}

impl From<PipelineError> for CliError {
    fn from(err: PipelineError) -> Self {
        CliError::PipelineError(err.user_message())
    }
}
