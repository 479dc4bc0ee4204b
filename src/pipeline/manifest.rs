//! Build manifest written next to the corpus

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::BuildStage;
use super::error::{PipelineError, PipelineResult};

/// File name of the manifest inside the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Aggregate card counts of a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCounts {
    /// Sets read from the database
    pub sets: usize,
    /// Primary records produced by the normalizer
    pub parsed: usize,
    /// Card objects the normalizer dropped
    pub unparsed: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Valid cards removed by the exclusion policy
    pub skipped: usize,
    pub duplicates: usize,
    /// Cards written to the corpus
    pub encoded: usize,
}

impl BuildCounts {
    /// Cards that failed to parse or validate
    pub fn bad_count(&self) -> usize {
        self.invalid + self.unparsed
    }
}

/// Record of one corpus build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Unique build ID
    pub run_id: String,
    pub name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: RunStatus,
    pub completed_stages: Vec<BuildStage>,
    /// Stage in progress, if any
    pub current_stage: Option<BuildStage>,
    /// Per-stage outputs keyed by stage name
    pub stage_outputs: HashMap<String, StageOutput>,
    pub counts: BuildCounts,
    /// Error message if failed
    pub error: Option<String>,
    /// Digest of the configuration used
    pub config_hash: String,
}

impl BuildManifest {
    pub fn new(run_id: impl Into<String>, config_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id: run_id.into(),
            name: None,
            started_at: now,
            updated_at: now,
            status: RunStatus::Running,
            completed_stages: Vec::new(),
            current_stage: None,
            stage_outputs: HashMap::new(),
            counts: BuildCounts::default(),
            error: None,
            config_hash: config_hash.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn start_stage(&mut self, stage: BuildStage) {
        self.current_stage = Some(stage);
        self.updated_at = Utc::now();
    }

    pub fn complete_stage(&mut self, stage: BuildStage, output: StageOutput) {
        self.completed_stages.push(stage);
        self.stage_outputs.insert(stage.name().to_string(), output);
        self.current_stage = None;
        self.updated_at = Utc::now();
    }

    pub fn skip_stage(&mut self, stage: BuildStage, reason: impl Into<String>) {
        self.stage_outputs
            .insert(stage.name().to_string(), StageOutput::skipped(reason));
        self.current_stage = None;
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.current_stage = None;
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }

    pub fn is_stage_completed(&self, stage: BuildStage) -> bool {
        self.completed_stages.contains(&stage)
    }

    pub fn get_stage_output(&self, stage: BuildStage) -> Option<&StageOutput> {
        self.stage_outputs.get(stage.name())
    }

    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| PipelineError::io_with_path(path, "writing manifest", e))
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::io_with_path(path, "reading manifest", e))?;
        serde_json::from_str(&json).map_err(|e| PipelineError::ManifestError(e.to_string()))
    }

    /// Manifest location for an output directory
    pub fn default_path(output_dir: &Path) -> PathBuf {
        output_dir.join(MANIFEST_FILE)
    }
}

/// Build status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Output of one build stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    pub success: bool,
    pub skipped: bool,
    pub skip_reason: Option<String>,
    /// Files the stage wrote
    pub files: Vec<PathBuf>,
    /// Stage-specific metadata (counts, digests)
    pub metadata: HashMap<String, serde_json::Value>,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl StageOutput {
    fn blank(success: bool, skip_reason: Option<String>) -> Self {
        Self {
            success,
            skipped: skip_reason.is_some(),
            skip_reason,
            files: Vec::new(),
            metadata: HashMap::new(),
            duration_ms: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn success() -> Self {
        Self::blank(true, None)
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::blank(true, Some(reason.into()))
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}
