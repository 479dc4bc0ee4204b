//! MTG Corpus - card database to training corpus pipeline
//!
//! Provides:
//! - Normalization of MTGJSON card databases into card records
//! - Validation of records (structure, stats, text, exclusion policy)
//! - Reminder-text stripping
//! - Encoding to and decoding from the private-use AI format
//! - Round-trip verification of an encoded corpus
//! - A staged corpus build with a JSON manifest and YAML stage dumps

pub mod cli;
pub mod codec;
pub mod export;
pub mod import;
pub mod models;
pub mod pipeline;
pub mod reminder;
pub mod validation;

// Re-export commonly used types
pub use codec::{
    DecodeError, Decoder, EncodeError, Encoder, SymbolError, SymbolTable, colors_used,
    error_correct,
};
pub use export::{CorpusSummary, ExportError};
pub use import::{ImportError, MtgJsonImporter, NormalizeOptions, NormalizeResult, SchemaError};
pub use models::{Card, FaceIndex, Side};
pub use pipeline::{
    BuildReport, BuildStage, CorpusBuilder, CorpusConfig, PipelineError, SampleReview,
    review_samples, run_build,
};
pub use reminder::ReminderStripper;
pub use validation::{
    CardValidator, ExclusionPolicy, RoundTripError, RoundTripMismatch, StandardExclusionPolicy,
    ValidationError,
};
