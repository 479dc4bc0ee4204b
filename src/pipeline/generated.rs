//! Quality review of model-generated samples
//!
//! Generated text is decoded and validated one sample at a time. Failures are
//! tallied, never raised.

use serde::Serialize;
use tracing::{debug, info};

use crate::codec::format::CARD_SEP;
use crate::codec::{DecodeError, Decoder};
use crate::models::Card;
use crate::validation::{CardValidator, ValidationError};

/// Why a generated sample was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("unparsed: {0}")]
    Unparsed(#[from] DecodeError),
    #[error("invalid: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleFailure {
    /// Position among the non-empty samples
    pub index: usize,
    pub reason: String,
}

/// Tally of one batch of generated samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleReview {
    pub valid: usize,
    pub invalid: usize,
    pub unparsed: usize,
    /// Decoded cards that passed validation
    pub cards: Vec<Card>,
    pub failures: Vec<SampleFailure>,
}

impl SampleReview {
    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.unparsed
    }

    /// Share of samples that decoded and validated, 0.0 for an empty batch
    pub fn valid_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.valid as f64 / total as f64,
        }
    }
}

/// Decode and validate a single sample
pub fn review_sample(
    sample: &str,
    decoder: &Decoder<'_>,
    validator: &CardValidator<'_>,
) -> Result<Card, SampleError> {
    let card = decoder.decode(sample)?;
    validator.validate(&card)?;
    Ok(card)
}

/// Split generated text into samples and review each of them
pub fn review_samples(
    text: &str,
    decoder: &Decoder<'_>,
    validator: &CardValidator<'_>,
) -> SampleReview {
    let mut review = SampleReview::default();

    let samples = text.split(CARD_SEP).filter(|s| !s.trim().is_empty());
    for (index, sample) in samples.enumerate() {
        match review_sample(sample, decoder, validator) {
            Ok(card) => {
                review.valid += 1;
                review.cards.push(card);
            }
            Err(err) => {
                debug!(index, error = %err, "Rejected generated sample");
                match err {
                    SampleError::Unparsed(_) => review.unparsed += 1,
                    SampleError::Invalid(_) => review.invalid += 1,
                }
                review.failures.push(SampleFailure {
                    index,
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        valid = review.valid,
        invalid = review.invalid,
        unparsed = review.unparsed,
        "Reviewed generated samples"
    );
    review
}
