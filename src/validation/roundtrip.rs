//! Round-trip verification
//!
//! Compares a dataset against the decode of its own encoding. Only the
//! fields in [`COMPARED_FIELDS`] take part; side fields are compared face by
//! face, so a difference on a back face is reported as e.g. `b_side.rarity`.

use serde::Serialize;
use tracing::{debug, info};

use crate::codec::DecodeError;
use crate::models::{COMPARED_FIELDS, Card, Side, field_repr};

/// One field that did not survive the round trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundTripMismatch {
    /// Position of the card in the compared dataset
    pub index: usize,
    pub name: String,
    /// Field path, e.g. `rarity` or `b_side.main_text`
    pub field: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for RoundTripMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "card {} ('{}') field '{}': expected {}, got {}",
            self.index, self.name, self.field, self.expected, self.actual
        )
    }
}

/// Error during round-trip verification
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoundTripError {
    #[error("Round-trip mismatch at {0}")]
    Mismatch(RoundTripMismatch),
    #[error("Round trip produced {actual} cards, expected {expected}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("Card {index} ('{name}') could not be decoded: {error}")]
    Undecodable {
        index: usize,
        name: String,
        error: DecodeError,
    },
}

/// A single differing field, without card position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDifference {
    pub field: String,
    pub expected: String,
    pub actual: String,
}

/// Every compared field on which `expected` and `actual` differ
pub fn compare_cards(expected: &Card, actual: &Card) -> Vec<FieldDifference> {
    let mut out = Vec::new();
    diff_into("", expected, actual, &mut out);
    out
}

fn diff_into(prefix: &str, expected: &Card, actual: &Card, out: &mut Vec<FieldDifference>) {
    for field in COMPARED_FIELDS {
        let path = format!("{prefix}{field}");
        match Side::from_field_name(field) {
            Some(side) => match (expected.side(side), actual.side(side)) {
                (Some(e), Some(a)) => diff_into(&format!("{path}."), e, a, out),
                (None, None) => {}
                _ => out.push(FieldDifference {
                    field: path,
                    expected: field_repr(expected, field),
                    actual: field_repr(actual, field),
                }),
            },
            None => {
                let e = field_repr(expected, field);
                let a = field_repr(actual, field);
                if e != a {
                    out.push(FieldDifference {
                        field: path,
                        expected: e,
                        actual: a,
                    });
                }
            }
        }
    }
}

/// All mismatches between two datasets of equal length, first field per card
pub fn find_mismatches(original: &[Card], roundtripped: &[Card]) -> Vec<RoundTripMismatch> {
    original
        .iter()
        .zip(roundtripped)
        .enumerate()
        .filter_map(|(index, (expected, actual))| {
            compare_cards(expected, actual)
                .into_iter()
                .next()
                .map(|diff| RoundTripMismatch {
                    index,
                    name: expected.name.clone(),
                    field: diff.field,
                    expected: diff.expected,
                    actual: diff.actual,
                })
        })
        .collect()
}

/// Fail on the first card whose compared fields differ
pub fn verify(original: &[Card], roundtripped: &[Card]) -> Result<(), RoundTripError> {
    if original.len() != roundtripped.len() {
        return Err(RoundTripError::CountMismatch {
            expected: original.len(),
            actual: roundtripped.len(),
        });
    }
    if let Some(mismatch) = find_mismatches(original, roundtripped).into_iter().next() {
        debug!(index = mismatch.index, field = %mismatch.field, "Round-trip mismatch");
        return Err(RoundTripError::Mismatch(mismatch));
    }
    info!(cards = original.len(), "Round trip verified");
    Ok(())
}
