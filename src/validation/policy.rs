//! Inclusion policy for the training corpus
//!
//! Decides whether an otherwise valid card belongs in the corpus. The decision
//! reads the retained source snapshot (`json_fields`); records without one are
//! never excluded.

use std::collections::BTreeSet;

use crate::models::Card;

/// Layouts that are not regular playable cards
pub const DEFAULT_EXCLUDED_LAYOUTS: &[&str] = &[
    "token",
    "double_faced_token",
    "emblem",
    "planar",
    "scheme",
    "vanguard",
    "art_series",
    "reversible_card",
    "augment",
    "host",
];

/// Opt-out filter applied by the validator as its last check
pub trait ExclusionPolicy: std::fmt::Debug + Send + Sync {
    /// Reason to exclude `card`, or `None` to keep it
    fn exclusion_reason(&self, card: &Card) -> Option<String>;
}

/// Keeps every card
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExclusions;

impl ExclusionPolicy for NoExclusions {
    fn exclusion_reason(&self, _card: &Card) -> Option<String> {
        None
    }
}

/// Excludes by set code, layout and the `isFunny` flag
#[derive(Debug, Clone)]
pub struct StandardExclusionPolicy {
    pub excluded_set_codes: BTreeSet<String>,
    pub excluded_layouts: BTreeSet<String>,
    pub reject_funny: bool,
}

impl Default for StandardExclusionPolicy {
    fn default() -> Self {
        Self {
            excluded_set_codes: BTreeSet::new(),
            excluded_layouts: DEFAULT_EXCLUDED_LAYOUTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reject_funny: true,
        }
    }
}

impl StandardExclusionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excluded_set_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_set_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excluded_layouts<I, S>(mut self, layouts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_layouts = layouts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reject_funny(mut self, reject: bool) -> Self {
        self.reject_funny = reject;
        self
    }
}

impl ExclusionPolicy for StandardExclusionPolicy {
    fn exclusion_reason(&self, card: &Card) -> Option<String> {
        card.json_fields.as_ref()?;

        if let Some(code) = card.source_set_code() {
            if self.excluded_set_codes.contains(code) {
                return Some(format!("set '{code}' is excluded"));
            }
        }
        if let Some(layout) = card.source_layout() {
            if self.excluded_layouts.contains(layout) {
                return Some(format!("layout '{layout}' is excluded"));
            }
        }
        if self.reject_funny && card.json_flag("isFunny") {
            return Some("card is marked as funny".to_string());
        }
        None
    }
}
