//! Validation functionality
//!
//! Provides validation logic for:
//! - Card records (required fields, stats, text, exclusion policy)
//! - Side-link forest structure
//! - Round-trip verification of encoded datasets

pub mod cards;
pub mod faces;
pub mod policy;
pub mod roundtrip;

pub use cards::{CardValidator, DEFAULT_TEXTLESS_TYPES, ValidationError};
pub use faces::{FaceForestReport, FaceGraphError, check_face_forest};
pub use policy::{DEFAULT_EXCLUDED_LAYOUTS, ExclusionPolicy, NoExclusions, StandardExclusionPolicy};
pub use roundtrip::{
    FieldDifference, RoundTripError, RoundTripMismatch, compare_cards, find_mismatches, verify,
};
