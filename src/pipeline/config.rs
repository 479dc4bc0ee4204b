//! Corpus build configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};
use crate::validation::{DEFAULT_EXCLUDED_LAYOUTS, DEFAULT_TEXTLESS_TYPES};

/// Set types left out of the corpus unless configured otherwise
pub const DEFAULT_EXCLUDED_SET_TYPES: &[&str] =
    &["funny", "memorabilia", "token", "minigame", "alchemy"];

/// Main corpus build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Name of the build
    pub name: Option<String>,
    /// Card database dump (`AllPrintings.json`)
    pub input: Option<PathBuf>,
    /// Directory receiving the corpus, manifest and YAML dumps
    pub output_dir: PathBuf,
    /// Corpus file name inside `output_dir`
    pub corpus_file: String,
    /// Stages to run (empty = all)
    pub stages: Vec<BuildStage>,
    pub excluded_set_types: Vec<String>,
    pub excluded_layouts: Vec<String>,
    /// Drop cards flagged `isFunny`
    pub reject_funny: bool,
    /// Types allowed to have no rules text
    pub textless_types: Vec<String>,
    pub strip_reminder_text: bool,
    /// Drop cards whose encoding repeats an earlier one
    pub deduplicate: bool,
    /// Keep the raw source object on each record (needed for exclusion)
    pub retain_json_fields: bool,
    /// Write YAML dumps of each stage
    pub dump_yaml: bool,
    /// Run the round-trip verification stage
    pub verify: bool,
    /// Invalid + unparsed count above which a legacy-format warning is shown
    pub bad_count_threshold: usize,
    pub dry_run: bool,
    pub verbose: bool,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            name: None,
            input: None,
            output_dir: PathBuf::from("output"),
            corpus_file: "corpus.txt".to_string(),
            stages: Vec::new(),
            excluded_set_types: owned(DEFAULT_EXCLUDED_SET_TYPES),
            excluded_layouts: owned(DEFAULT_EXCLUDED_LAYOUTS),
            reject_funny: true,
            textless_types: owned(DEFAULT_TEXTLESS_TYPES),
            strip_reminder_text: true,
            deduplicate: true,
            retain_json_fields: true,
            dump_yaml: true,
            verify: true,
            bad_count_threshold: 1000,
            dry_run: false,
            verbose: false,
        }
    }
}

impl CorpusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML configuration file. Missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> PipelineResult<Self> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::io_with_path(path, "reading config", e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> PipelineResult<Self> {
        toml::from_str(content).map_err(|e| PipelineError::ConfigError(e.to_string()))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn with_corpus_file(mut self, name: impl Into<String>) -> Self {
        self.corpus_file = name.into();
        self
    }

    pub fn with_stages(mut self, stages: Vec<BuildStage>) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_excluded_set_types(mut self, types: Vec<String>) -> Self {
        self.excluded_set_types = types;
        self
    }

    pub fn with_excluded_layouts(mut self, layouts: Vec<String>) -> Self {
        self.excluded_layouts = layouts;
        self
    }

    pub fn with_reject_funny(mut self, reject: bool) -> Self {
        self.reject_funny = reject;
        self
    }

    pub fn with_textless_types(mut self, types: Vec<String>) -> Self {
        self.textless_types = types;
        self
    }

    pub fn with_strip_reminder_text(mut self, strip: bool) -> Self {
        self.strip_reminder_text = strip;
        self
    }

    pub fn with_deduplicate(mut self, dedup: bool) -> Self {
        self.deduplicate = dedup;
        self
    }

    pub fn with_retain_json_fields(mut self, retain: bool) -> Self {
        self.retain_json_fields = retain;
        self
    }

    pub fn with_dump_yaml(mut self, dump: bool) -> Self {
        self.dump_yaml = dump;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_bad_count_threshold(mut self, threshold: usize) -> Self {
        self.bad_count_threshold = threshold;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Stages to run, in execution order
    pub fn effective_stages(&self) -> Vec<BuildStage> {
        BuildStage::all()
            .into_iter()
            .filter(|s| self.should_run_stage(*s))
            .collect()
    }

    pub fn should_run_stage(&self, stage: BuildStage) -> bool {
        self.stages.is_empty() || self.stages.contains(&stage)
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.output_dir.join(&self.corpus_file)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.input.is_none() {
            return Err("Input database path is required".to_string());
        }
        if self.corpus_file.is_empty()
            || self.corpus_file.contains('/')
            || self.corpus_file.contains('\\')
        {
            return Err(format!(
                "Corpus file must be a plain file name, got '{}'",
                self.corpus_file
            ));
        }

        // Stages hand their data to the next one in memory
        for stage in self.effective_stages() {
            if let Some(needed) = stage.requires() {
                if !self.should_run_stage(needed) {
                    return Err(format!(
                        "Stage '{}' requires stage '{}'",
                        stage.name(),
                        needed.name()
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Corpus build stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStage {
    /// Stage 1: Load the database and normalize cards
    Normalize,
    /// Stage 2: Validate records and apply the exclusion policy
    Validate,
    /// Stage 3: Standardize, deduplicate, encode and write the corpus
    Encode,
    /// Stage 4: Decode the corpus and compare with the standardized cards
    Verify,
}

impl BuildStage {
    /// All stages in execution order
    pub fn all() -> Vec<Self> {
        vec![Self::Normalize, Self::Validate, Self::Encode, Self::Verify]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Normalize => "normalize",
            Self::Validate => "validate",
            Self::Encode => "encode",
            Self::Verify => "verify",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Normalize => "Load the card database and normalize records",
            Self::Validate => "Validate records and apply the exclusion policy",
            Self::Encode => "Encode cards and write the corpus",
            Self::Verify => "Verify the corpus decodes back to the same cards",
        }
    }

    /// The stage whose output this one consumes
    pub fn requires(&self) -> Option<Self> {
        match self {
            Self::Normalize => None,
            Self::Validate => Some(Self::Normalize),
            Self::Encode => Some(Self::Validate),
            Self::Verify => Some(Self::Encode),
        }
    }
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for BuildStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normalize" | "1" => Ok(Self::Normalize),
            "validate" | "2" => Ok(Self::Validate),
            "encode" | "3" => Ok(Self::Encode),
            "verify" | "4" => Ok(Self::Verify),
            _ => Err(format!("Unknown stage: {}", s)),
        }
    }
}
