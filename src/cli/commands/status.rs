//! `status` command

use std::path::Path;

use crate::cli::error::CliError;
use crate::pipeline::BuildManifest;

/// Handle the `status` command
pub fn handle_status(output_dir: &Path) -> Result<(), CliError> {
    let path = BuildManifest::default_path(output_dir);

    if !path.exists() {
        eprintln!("No build manifest found in: {}", output_dir.display());
        eprintln!("Run 'mtg-corpus build' to build a corpus.");
        return Ok(());
    }

    let manifest = BuildManifest::load(&path)?;

    eprintln!("Corpus Build Status");
    eprintln!("===================");
    eprintln!();
    eprintln!("Run ID:   {}", manifest.run_id);
    eprintln!("Status:   {}", manifest.status);
    eprintln!(
        "Started:  {}",
        manifest.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    eprintln!(
        "Updated:  {}",
        manifest.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let counts = manifest.counts;
    eprintln!(
        "Cards:    {} valid, {} invalid, {} skipped, {} unparsed, {} encoded",
        counts.valid, counts.invalid, counts.skipped, counts.unparsed, counts.encoded
    );
    eprintln!();
    eprintln!("Completed Stages:");
    for stage in &manifest.completed_stages {
        match manifest.get_stage_output(*stage) {
            Some(output) => eprintln!(
                "  - {}: ok ({}ms) {}",
                stage.name(),
                output.duration_ms,
                stage.description()
            ),
            None => eprintln!("  - {}: ok {}", stage.name(), stage.description()),
        }
    }

    if let Some(stage) = &manifest.current_stage {
        eprintln!();
        eprintln!("Current Stage: {} ({})", stage.name(), stage.description());
    }

    if let Some(ref error) = manifest.error {
        eprintln!();
        eprintln!("Error: {}", error);
    }

    Ok(())
}
