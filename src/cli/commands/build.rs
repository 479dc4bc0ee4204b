//! `build` command

use std::path::PathBuf;

use crate::cli::error::CliError;
use crate::pipeline::{BuildStage, CorpusBuilder, CorpusConfig};

/// Arguments for the `build` command
#[derive(Debug, Default)]
pub struct BuildArgs {
    /// TOML configuration file; flags below override it
    pub config_file: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Stages to run (empty = all); must be a prefix of the stage order
    pub stages: Vec<String>,
    pub no_verify: bool,
    pub no_yaml: bool,
    pub keep_reminder_text: bool,
    pub keep_duplicates: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

impl BuildArgs {
    /// Resolve the effective configuration
    pub fn to_config(&self) -> Result<CorpusConfig, CliError> {
        let mut config = match &self.config_file {
            Some(path) => CorpusConfig::from_toml_file(path)?,
            None => CorpusConfig::default(),
        };

        let stages: Vec<BuildStage> = self
            .stages
            .iter()
            .map(|s| s.parse::<BuildStage>().map_err(CliError::InvalidArgument))
            .collect::<Result<_, _>>()?;
        if !stages.is_empty() {
            config = config.with_stages(stages);
        }
        if let Some(input) = &self.input {
            config = config.with_input(input);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if self.no_verify {
            config = config.with_verify(false);
        }
        if self.no_yaml {
            config = config.with_dump_yaml(false);
        }
        if self.keep_reminder_text {
            config = config.with_strip_reminder_text(false);
        }
        if self.keep_duplicates {
            config = config.with_deduplicate(false);
        }
        if self.dry_run {
            config = config.with_dry_run(true);
        }
        if self.verbose {
            config = config.with_verbose(true);
        }
        Ok(config)
    }
}

/// Handle the `build` command
pub fn handle_build(args: &BuildArgs) -> Result<(), CliError> {
    let config = args.to_config()?;
    let mut builder = CorpusBuilder::new(config)?;

    eprintln!("Starting corpus build: {}", builder.manifest().run_id);

    let report = builder.run()?;
    report.print_summary();

    if report.is_success() {
        eprintln!();
        eprintln!("Corpus build completed successfully!");
        Ok(())
    } else {
        Err(CliError::PipelineError("Corpus build failed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = BuildArgs {
            input: Some(PathBuf::from("AllPrintings.json")),
            stages: vec!["normalize".to_string(), "validate".to_string()],
            no_yaml: true,
            ..Default::default()
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.input, Some(PathBuf::from("AllPrintings.json")));
        assert_eq!(config.stages.len(), 2);
        assert!(!config.dump_yaml);
        assert!(config.verify);
    }

    #[test]
    fn test_unknown_stage() {
        let args = BuildArgs {
            stages: vec!["render".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            args.to_config(),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
