//! YAML stage dumps for manual diffing

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::ExportError;

pub fn to_yaml_string<T: Serialize + ?Sized>(value: &T) -> Result<String, ExportError> {
    serde_yaml::to_string(value).map_err(|e| ExportError::SerializationError(e.to_string()))
}

/// Serialize `value` to `dir/name.yaml`
pub fn dump_yaml<T: Serialize + ?Sized>(
    dir: &Path,
    name: &str,
    value: &T,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;
    let path = dir.join(format!("{name}.yaml"));
    let yaml = to_yaml_string(value)?;
    std::fs::write(&path, yaml).map_err(|e| ExportError::io(&path, e))?;
    debug!(path = %path.display(), "YAML dump written");
    Ok(path)
}
