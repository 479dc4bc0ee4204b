//! CLI command implementations

pub mod build;
pub mod decode;
pub mod status;
pub mod strip;

use std::io::Read;
use std::path::PathBuf;

use super::error::CliError;

/// Load input content from a file, or stdin when `input` is `-`
pub(crate) fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}
