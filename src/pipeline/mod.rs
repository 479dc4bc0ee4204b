//! Corpus build pipeline
//!
//! Orchestrates a full rebuild of the training corpus from a card database:
//! - Loading and normalizing the database into card records
//! - Validating records and applying the exclusion policy
//! - Standardizing, deduplicating and encoding cards into the corpus file
//! - Decoding the corpus back and verifying it against the standardized cards
//!
//! # Example
//!
//! ```rust,ignore
//! use mtg_corpus::pipeline::{CorpusBuilder, CorpusConfig};
//!
//! let config = CorpusConfig::new()
//!     .with_input("AllPrintings.json")
//!     .with_output_dir("out");
//!
//! let mut builder = CorpusBuilder::new(config)?;
//! let report = builder.run()?;
//!
//! println!("{} cards in {}", report.counts.encoded, report.duration_formatted());
//! ```
//!
//! # Stages
//!
//! 1. **Normalize**: Parse the database and attach faces to their primaries
//! 2. **Validate**: Drop malformed and excluded cards
//! 3. **Encode**: Write the corpus (and `standardized.yaml`)
//! 4. **Verify**: Fail the build if any card does not survive a round trip
//!
//! Each run writes `manifest.json` into the output directory with the run id,
//! per-stage outputs and aggregate counts.

pub mod config;
pub mod error;
pub mod executor;
pub mod generated;
pub mod manifest;

pub use config::{BuildStage, CorpusConfig, DEFAULT_EXCLUDED_SET_TYPES};
pub use error::{PipelineError, PipelineResult};
pub use executor::{BuildReport, CorpusBuilder, corpus_lines, read_corpus};
pub use generated::{SampleError, SampleFailure, SampleReview, review_sample, review_samples};
pub use manifest::{BuildCounts, BuildManifest, MANIFEST_FILE, RunStatus, StageOutput};

/// Build a corpus with the given configuration
pub fn run_build(config: CorpusConfig) -> PipelineResult<BuildReport> {
    CorpusBuilder::new(config)?.run()
}
