//! Corpus build executor

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use sha2::{Digest, Sha256};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use super::config::{BuildStage, CorpusConfig};
use super::error::{PipelineError, PipelineResult};
use super::manifest::{BuildCounts, BuildManifest, RunStatus, StageOutput};
use crate::codec::format::CARD_SEP;
use crate::codec::{Decoder, Encoder, SymbolTable};
use crate::export::{CorpusSummary, dump_yaml, write_corpus};
use crate::import::{MtgJsonImporter, NormalizeOptions, NormalizeResult};
use crate::models::Card;
use crate::validation::{
    CardValidator, RoundTripError, StandardExclusionPolicy, check_face_forest, find_mismatches,
    verify,
};

/// Data handed from one stage to the next
#[derive(Debug, Default)]
struct BuildState {
    normalized: Option<NormalizeResult>,
    valid: Vec<Card>,
    standardized: Vec<Card>,
    encoded: Vec<String>,
    corpus: Option<CorpusSummary>,
}

/// Runs the corpus build stages in order
pub struct CorpusBuilder {
    config: CorpusConfig,
    manifest: BuildManifest,
    state: BuildState,
}

impl CorpusBuilder {
    pub fn new(config: CorpusConfig) -> PipelineResult<Self> {
        config.validate().map_err(PipelineError::ConfigError)?;

        let config_hash = Self::hash_config(&config);
        let run_id = Uuid::new_v4().to_string();
        let mut manifest = BuildManifest::new(run_id, config_hash);
        if let Some(name) = &config.name {
            manifest = manifest.with_name(name.clone());
        }

        Ok(Self {
            config,
            manifest,
            state: BuildState::default(),
        })
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    pub fn manifest(&self) -> &BuildManifest {
        &self.manifest
    }

    /// Normalizer output, once the normalize stage has run
    pub fn normalized(&self) -> Option<&NormalizeResult> {
        self.state.normalized.as_ref()
    }

    /// Cards that passed validation
    pub fn valid_cards(&self) -> &[Card] {
        &self.state.valid
    }

    /// Cards as they appear in the corpus, after the unreversible modifications
    pub fn standardized(&self) -> &[Card] {
        &self.state.standardized
    }

    /// Encoded corpus lines
    pub fn encoded(&self) -> &[String] {
        &self.state.encoded
    }

    /// Run the build
    pub fn run(&mut self) -> PipelineResult<BuildReport> {
        let _span = info_span!(
            "corpus_build",
            run_id = %self.manifest.run_id,
            dry_run = self.config.dry_run
        )
        .entered();

        let start = Instant::now();
        let stages = self.config.effective_stages();

        info!(
            run_id = %self.manifest.run_id,
            stages = ?stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            dry_run = self.config.dry_run,
            "Starting corpus build"
        );

        if self.config.verbose {
            eprintln!("Corpus build: {}", self.manifest.run_id);
            eprintln!(
                "Stages to run: {:?}",
                stages.iter().map(|s| s.name()).collect::<Vec<_>>()
            );
            if self.config.dry_run {
                eprintln!("DRY RUN MODE - nothing will be written");
            }
        }

        if self.config.dry_run {
            return self.dry_run(&stages);
        }

        std::fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            PipelineError::io_with_path(&self.config.output_dir, "creating output directory", e)
        })?;

        for stage in &stages {
            if let Some(reason) = self.should_skip_stage(*stage) {
                debug!(stage = stage.name(), reason = %reason, "Skipping stage");
                if self.config.verbose {
                    eprintln!("Skipping stage {}: {}", stage.name(), reason);
                }
                self.manifest.skip_stage(*stage, &reason);
                self.save_manifest()?;
                continue;
            }

            let _stage_span = info_span!("build_stage", stage = stage.name()).entered();
            info!(stage = stage.name(), "Starting stage");

            if self.config.verbose {
                eprintln!("Running stage {}...", stage.name());
            }

            self.manifest.start_stage(*stage);
            self.save_manifest()?;

            match self.run_stage(*stage) {
                Ok(output) => {
                    info!(
                        stage = stage.name(),
                        duration_ms = output.duration_ms,
                        "Stage completed"
                    );
                    if self.config.verbose {
                        eprintln!(
                            "Stage {} completed in {}ms",
                            stage.name(),
                            output.duration_ms
                        );
                    }
                    self.manifest.complete_stage(*stage, output);
                    self.save_manifest()?;
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    error!(stage = stage.name(), error = %error_msg, "Stage failed");
                    eprintln!("Stage {} failed: {}", stage.name(), error_msg);
                    self.manifest.fail(&error_msg);
                    self.save_manifest()?;
                    return Err(e);
                }
            }
        }

        self.manifest.complete();
        self.save_manifest()?;

        let duration = start.elapsed();
        let counts = self.manifest.counts;
        info!(
            run_id = %self.manifest.run_id,
            duration_ms = duration.as_millis() as u64,
            valid = counts.valid,
            invalid = counts.invalid,
            skipped = counts.skipped,
            unparsed = counts.unparsed,
            "Corpus build completed"
        );

        Ok(self.report(duration.as_millis() as u64))
    }

    fn report(&self, duration_ms: u64) -> BuildReport {
        BuildReport {
            run_id: self.manifest.run_id.clone(),
            status: self.manifest.status,
            stages_completed: self.manifest.completed_stages.clone(),
            duration_ms,
            outputs: self.manifest.stage_outputs.clone(),
            counts: self.manifest.counts,
            corpus: self.state.corpus.clone(),
        }
    }

    fn should_skip_stage(&self, stage: BuildStage) -> Option<String> {
        match stage {
            BuildStage::Verify if !self.config.verify => {
                Some("round-trip verification disabled".to_string())
            }
            _ => None,
        }
    }

    fn run_stage(&mut self, stage: BuildStage) -> PipelineResult<StageOutput> {
        let start = Instant::now();

        let output = match stage {
            BuildStage::Normalize => self.run_normalize()?,
            BuildStage::Validate => self.run_validate()?,
            BuildStage::Encode => self.run_encode()?,
            BuildStage::Verify => self.run_verify()?,
        };

        Ok(output.with_duration(start.elapsed().as_millis() as u64))
    }

    fn run_normalize(&mut self) -> PipelineResult<StageOutput> {
        let input = self
            .config
            .input
            .as_ref()
            .ok_or_else(|| PipelineError::MissingInput("card database".to_string()))?;
        if !input.exists() {
            warn!(input = %input.display(), "Card database not found");
            return Err(PipelineError::FileNotFound(input.clone()));
        }

        debug!(input = %input.display(), "Loading card database");
        let importer = MtgJsonImporter::new(
            NormalizeOptions::default()
                .with_retain_json_fields(self.config.retain_json_fields)
                .with_excluded_set_types(self.config.excluded_set_types.iter().cloned()),
        );
        let db = importer.load_file(input)?;
        let result = importer.normalize(&db);

        let forest = check_face_forest(&result.cards)
            .map_err(|e| PipelineError::stage_failure(BuildStage::Normalize.name(), e))?;

        let counts = &mut self.manifest.counts;
        counts.sets = result.sets_seen;
        counts.parsed = result.cards.len();
        counts.unparsed = result.errors.len();

        let mut output = StageOutput::success()
            .with_metadata("sets", serde_json::json!(result.sets_seen))
            .with_metadata("raw_cards", serde_json::json!(result.raw_cards))
            .with_metadata("cards", serde_json::json!(result.cards.len()))
            .with_metadata("faces", serde_json::json!(forest.faces))
            .with_metadata("unparsed", serde_json::json!(result.errors.len()))
            .with_metadata(
                "excluded_sets",
                serde_json::json!(result.excluded_set_codes),
            );

        if self.config.dump_yaml {
            let path = dump_yaml(&self.config.output_dir, "original", &result.cards)?;
            output = output.with_file(path);
        }

        self.state.normalized = Some(result);
        Ok(output)
    }

    fn run_validate(&mut self) -> PipelineResult<StageOutput> {
        let normalized = self
            .state
            .normalized
            .as_ref()
            .ok_or_else(|| PipelineError::MissingInput("normalized cards".to_string()))?;

        let policy = StandardExclusionPolicy::new()
            .with_excluded_set_codes(normalized.excluded_set_codes.iter().cloned())
            .with_excluded_layouts(self.config.excluded_layouts.iter().cloned())
            .with_reject_funny(self.config.reject_funny);
        let validator = CardValidator::standard()
            .with_textless_types(self.config.textless_types.iter().cloned())
            .with_policy(policy);

        let mut valid = Vec::new();
        let (mut invalid, mut skipped) = (0, 0);
        for card in &normalized.cards {
            match validator.validate(card) {
                Ok(()) => valid.push(card.clone()),
                Err(e) if e.is_exclusion() => {
                    debug!(card = %card.name, reason = %e, "Card excluded");
                    skipped += 1;
                }
                Err(e) => {
                    debug!(card = %card.name, error = %e, "Card failed validation");
                    invalid += 1;
                }
            }
        }

        let counts = &mut self.manifest.counts;
        counts.valid = valid.len();
        counts.invalid = invalid;
        counts.skipped = skipped;

        info!(
            valid = counts.valid,
            invalid = counts.invalid,
            skipped = counts.skipped,
            unparsed = counts.unparsed,
            "Validation complete"
        );

        let bad = counts.bad_count();
        if bad > self.config.bad_count_threshold {
            warn!(
                bad,
                threshold = self.config.bad_count_threshold,
                "Many cards failed to parse or validate; the input may be an unrecognized legacy format"
            );
            eprintln!(
                "Warning: {} cards failed to parse or validate (threshold {}). \
                 The input may be in an older, unrecognized format.",
                bad, self.config.bad_count_threshold
            );
        }

        let output = StageOutput::success()
            .with_metadata("valid", serde_json::json!(valid.len()))
            .with_metadata("invalid", serde_json::json!(invalid))
            .with_metadata("skipped", serde_json::json!(skipped));
        self.state.valid = valid;
        Ok(output)
    }

    fn run_encode(&mut self) -> PipelineResult<StageOutput> {
        let encoder = if self.config.strip_reminder_text {
            Encoder::standard()
        } else {
            Encoder::new(SymbolTable::standard())
        };

        let mut seen = HashSet::new();
        let mut standardized = Vec::with_capacity(self.state.valid.len());
        let mut encoded = Vec::with_capacity(self.state.valid.len());
        let mut duplicates = 0;

        for card in &self.state.valid {
            let card = encoder.unreversible_modifications(card);
            let line = encoder
                .encode_exact(&card)
                .map_err(|e| PipelineError::stage_failure(BuildStage::Encode.name(), e))?;
            if self.config.deduplicate && !seen.insert(line.clone()) {
                debug!(card = %card.name, "Dropping duplicate card");
                duplicates += 1;
                continue;
            }
            standardized.push(card);
            encoded.push(line);
        }

        let summary = write_corpus(&self.config.corpus_path(), &encoded)?;

        let counts = &mut self.manifest.counts;
        counts.duplicates = duplicates;
        counts.encoded = encoded.len();

        let mut output = StageOutput::success()
            .with_file(&summary.path)
            .with_metadata("cards", serde_json::json!(summary.cards))
            .with_metadata("duplicates", serde_json::json!(duplicates))
            .with_metadata("bytes", serde_json::json!(summary.bytes))
            .with_metadata("sha256", serde_json::json!(summary.sha256))
            .with_metadata("alphabet_size", serde_json::json!(summary.alphabet_size));

        if self.config.dump_yaml {
            let path = dump_yaml(&self.config.output_dir, "standardized", &standardized)?;
            output = output.with_file(path);
        }

        self.state.standardized = standardized;
        self.state.encoded = encoded;
        self.state.corpus = Some(summary);
        Ok(output)
    }

    fn run_verify(&mut self) -> PipelineResult<StageOutput> {
        let path = self.config.corpus_path();
        let text = std::fs::read_to_string(&path)
            .map_err(|e| PipelineError::io_with_path(&path, "reading corpus", e))?;
        let lines = corpus_lines(&text);

        let decoder = Decoder::standard();
        let mut roundtripped = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            let card = decoder.decode(line).map_err(|error| RoundTripError::Undecodable {
                index,
                name: self
                    .state
                    .standardized
                    .get(index)
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                error,
            })?;
            roundtripped.push(card);
        }

        let mut output =
            StageOutput::success().with_metadata("cards", serde_json::json!(roundtripped.len()));

        if self.config.dump_yaml {
            let mismatches = find_mismatches(&self.state.standardized, &roundtripped);
            let dir = &self.config.output_dir;
            output = output
                .with_file(dump_yaml(dir, "roundtripped", &roundtripped)?)
                .with_file(dump_yaml(dir, "mismatches", &mismatches)?);
        }

        verify(&self.state.standardized, &roundtripped)?;
        Ok(output)
    }

    /// Run in dry-run mode (validation only)
    fn dry_run(&self, stages: &[BuildStage]) -> PipelineResult<BuildReport> {
        let mut validation_errors = Vec::new();

        for stage in stages {
            if let Err(e) = self.validate_stage(*stage) {
                validation_errors.push(format!("{}: {}", stage.name(), e));
            }
        }

        if !validation_errors.is_empty() {
            return Err(PipelineError::ConfigError(format!(
                "Validation errors:\n  {}",
                validation_errors.join("\n  ")
            )));
        }

        eprintln!("Dry run validation passed for all stages:");
        for stage in stages {
            eprintln!("  - {}: {}", stage.name(), stage.description());
        }

        Ok(BuildReport {
            run_id: self.manifest.run_id.clone(),
            status: RunStatus::Completed,
            stages_completed: Vec::new(),
            duration_ms: 0,
            outputs: HashMap::new(),
            counts: BuildCounts::default(),
            corpus: None,
        })
    }

    fn validate_stage(&self, stage: BuildStage) -> PipelineResult<()> {
        match stage {
            BuildStage::Normalize => {
                let input = self
                    .config
                    .input
                    .as_ref()
                    .ok_or_else(|| PipelineError::MissingInput("card database".to_string()))?;
                if !input.exists() {
                    return Err(PipelineError::FileNotFound(input.clone()));
                }
            }
            BuildStage::Encode => {
                if self.config.output_dir.is_file() {
                    return Err(PipelineError::ConfigError(format!(
                        "output directory {} is a file",
                        self.config.output_dir.display()
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn save_manifest(&self) -> PipelineResult<()> {
        let path = BuildManifest::default_path(&self.config.output_dir);
        self.manifest.save(&path)
    }

    /// Hash the settings that affect corpus contents
    fn hash_config(config: &CorpusConfig) -> String {
        let mut hasher = Sha256::new();
        if let Some(ref input) = config.input {
            hasher.update(input.display().to_string().as_bytes());
        }
        hasher.update(config.corpus_file.as_bytes());
        for list in [
            &config.excluded_set_types,
            &config.excluded_layouts,
            &config.textless_types,
        ] {
            hasher.update(list.join(",").as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([
            config.reject_funny as u8,
            config.strip_reminder_text as u8,
            config.deduplicate as u8,
            config.retain_json_fields as u8,
        ]);
        format!("{:x}", hasher.finalize())
    }
}

/// Split corpus text into encoded cards, dropping the trailing separator
pub fn corpus_lines(text: &str) -> Vec<&str> {
    let body = text.strip_suffix(CARD_SEP).unwrap_or(text);
    if body.is_empty() {
        Vec::new()
    } else {
        body.split(CARD_SEP).collect()
    }
}

/// Read an encoded corpus file into lines
pub fn read_corpus(path: &Path) -> PipelineResult<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::io_with_path(path, "reading corpus", e))?;
    Ok(corpus_lines(&text).into_iter().map(str::to_string).collect())
}

/// Report from a corpus build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub run_id: String,
    pub status: RunStatus,
    pub stages_completed: Vec<BuildStage>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
    pub outputs: HashMap<String, StageOutput>,
    pub counts: BuildCounts,
    /// Written corpus, if the encode stage ran
    pub corpus: Option<CorpusSummary>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn duration_formatted(&self) -> String {
        let secs = self.duration_ms / 1000;
        let mins = secs / 60;
        let remaining_secs = secs % 60;

        if mins > 0 {
            format!("{}m {}s", mins, remaining_secs)
        } else {
            format!("{}s", secs)
        }
    }

    /// Print summary to stderr
    pub fn print_summary(&self) {
        eprintln!();
        eprintln!("Corpus build {} - {}", self.run_id, self.status);
        eprintln!("Duration: {}", self.duration_formatted());
        eprintln!(
            "Cards: {} valid, {} invalid, {} skipped, {} unparsed",
            self.counts.valid, self.counts.invalid, self.counts.skipped, self.counts.unparsed
        );
        eprintln!("Stages completed: {}", self.stages_completed.len());

        for stage in &self.stages_completed {
            if let Some(output) = self.outputs.get(stage.name()) {
                let status = if output.skipped {
                    "skipped"
                } else if output.success {
                    "ok"
                } else {
                    "failed"
                };
                eprintln!(
                    "  - {}: {} ({}ms)",
                    stage.name(),
                    status,
                    output.duration_ms
                );
            }
        }

        if let Some(corpus) = &self.corpus {
            eprintln!(
                "Corpus: {} ({} cards, {} duplicates dropped, sha256 {})",
                corpus.path.display(),
                corpus.cards,
                self.counts.duplicates,
                corpus.sha256
            );
        }
    }
}
