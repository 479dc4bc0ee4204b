//! Card record validation
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. required fields and reserved characters, on every face
//! 2. side-link structure
//! 3. power/toughness against declared types, on every face
//! 4. rules text against the textless-type allowlist, on every face
//! 5. the exclusion policy, on the primary only

use std::collections::BTreeSet;

use crate::codec::SymbolTable;
use crate::codec::symbols::is_private_use;
use crate::models::Card;

use super::policy::{ExclusionPolicy, StandardExclusionPolicy};

/// Types that may legitimately have no rules text
pub const DEFAULT_TEXTLESS_TYPES: &[&str] = &["Creature", "Land", "Artifact"];

/// Subtypes that carry power/toughness without being creatures
const NONCREATURE_STAT_SUBTYPES: &[&str] = &["Vehicle", "Spacecraft"];

/// Error during card validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Card name is empty")]
    EmptyName,
    #[error("Card '{name}' has unknown rarity '{rarity}'")]
    UnknownRarity { name: String, rarity: String },
    #[error("Field '{field}' of '{name}' contains reserved character U+{:04X}", *.ch as u32)]
    ReservedCharacter {
        name: String,
        field: &'static str,
        ch: char,
    },
    #[error("Card '{name}' has an empty {field} entry")]
    EmptyTypeEntry { name: String, field: &'static str },
    #[error("Card '{name}' has a malformed cost: {reason}")]
    MalformedCost { name: String, reason: String },
    #[error("Card '{name}' has invalid side links: {reason}")]
    InvalidSides { name: String, reason: String },
    #[error("Card '{name}' has power/toughness inconsistent with its types")]
    InconsistentPowerToughness { name: String },
    #[error("Card '{name}' has no rules text and is not a textless type")]
    MissingText { name: String },
    #[error("Card '{name}' is excluded: {reason}")]
    Excluded { name: String, reason: String },
}

impl ValidationError {
    /// Whether the card was rejected by the exclusion policy rather than
    /// being malformed
    pub fn is_exclusion(&self) -> bool {
        matches!(self, ValidationError::Excluded { .. })
    }
}

/// Validates normalized or decoded card records
#[derive(Debug)]
pub struct CardValidator<'a> {
    table: &'a SymbolTable,
    textless_types: BTreeSet<String>,
    policy: Box<dyn ExclusionPolicy>,
}

impl CardValidator<'static> {
    /// Validator over the standard table with the standard exclusion policy
    pub fn standard() -> Self {
        CardValidator::new(SymbolTable::standard())
    }
}

impl<'a> CardValidator<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self {
            table,
            textless_types: DEFAULT_TEXTLESS_TYPES.iter().map(|s| s.to_string()).collect(),
            policy: Box::new(StandardExclusionPolicy::default()),
        }
    }

    pub fn with_policy(mut self, policy: impl ExclusionPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn with_textless_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.textless_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn policy(&self) -> &dyn ExclusionPolicy {
        self.policy.as_ref()
    }

    pub fn validate(&self, card: &Card) -> Result<(), ValidationError> {
        for face in faces(card) {
            self.check_fields(face)?;
        }
        check_sides(card)?;
        for face in faces(card) {
            check_power_toughness(face)?;
        }
        for face in faces(card) {
            self.check_text(face)?;
        }
        if let Some(reason) = self.policy.exclusion_reason(card) {
            return Err(ValidationError::Excluded {
                name: card.name.clone(),
                reason,
            });
        }
        Ok(())
    }

    fn check_fields(&self, face: &Card) -> Result<(), ValidationError> {
        if face.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !self.table.is_known_rarity(&face.rarity) {
            return Err(ValidationError::UnknownRarity {
                name: face.name.clone(),
                rarity: face.rarity.clone(),
            });
        }

        check_plain(face, "name", &face.name)?;
        if let Some(cost) = &face.cost {
            check_plain(face, "cost", cost)?;
        }
        if let Some(text) = &face.main_text {
            if let Some(ch) = text.chars().find(|&c| is_private_use(c)) {
                return Err(reserved(face, "main_text", ch));
            }
        }
        for (field, types) in [
            ("supertypes", &face.supertypes),
            ("maintypes", &face.maintypes),
            ("subtypes", &face.subtypes),
        ] {
            for entry in types {
                if entry.is_empty() {
                    return Err(ValidationError::EmptyTypeEntry {
                        name: face.name.clone(),
                        field,
                    });
                }
                check_plain(face, field, entry)?;
            }
        }

        if let Some(cost) = &face.cost {
            self.table
                .tokenize_cost(cost)
                .map_err(|e| ValidationError::MalformedCost {
                    name: face.name.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    fn check_text(&self, face: &Card) -> Result<(), ValidationError> {
        let has_text = face
            .main_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if has_text || face.has_any_type(&self.textless_types) {
            Ok(())
        } else {
            Err(ValidationError::MissingText {
                name: face.name.clone(),
            })
        }
    }
}

fn faces(card: &Card) -> impl Iterator<Item = &Card> {
    std::iter::once(card).chain(card.sides().map(|(_, face)| face))
}

fn reserved(face: &Card, field: &'static str, ch: char) -> ValidationError {
    ValidationError::ReservedCharacter {
        name: face.name.clone(),
        field,
        ch,
    }
}

fn check_plain(face: &Card, field: &'static str, value: &str) -> Result<(), ValidationError> {
    match value
        .chars()
        .find(|&c| is_private_use(c) || c == '\n' || c == '\r')
    {
        Some(ch) => Err(reserved(face, field, ch)),
        None => Ok(()),
    }
}

fn check_sides(card: &Card) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidSides {
        name: card.name.clone(),
        reason,
    };
    let expected = 1 + card.linked_side_count();
    if card.num_sides as usize != expected {
        return Err(invalid(format!(
            "num_sides is {} but {} faces are linked",
            card.num_sides, expected
        )));
    }
    if !card.sides_are_contiguous() {
        return Err(invalid("sides are not filled from b_side".to_string()));
    }
    for (side, face) in card.sides() {
        if face.has_side_links() {
            return Err(invalid(format!("{} owns sides of its own", side.field_name())));
        }
        if face.num_sides != 1 {
            return Err(invalid(format!(
                "{} has num_sides {}",
                side.field_name(),
                face.num_sides
            )));
        }
    }
    Ok(())
}

fn check_power_toughness(face: &Card) -> Result<(), ValidationError> {
    let is_creature = face.maintypes.contains("Creature");
    let has_stat_subtype = NONCREATURE_STAT_SUBTYPES
        .iter()
        .any(|t| face.subtypes.contains(*t));

    let consistent = match face.power_toughness {
        Some(_) => is_creature || has_stat_subtype,
        None => !is_creature,
    };
    if consistent {
        Ok(())
    } else {
        Err(ValidationError::InconsistentPowerToughness {
            name: face.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;
    use crate::validation::NoExclusions;
    use serde_json::json;

    fn bear() -> Card {
        Card::new("Grizzly Bears", "common")
            .with_cost("{1}{G}")
            .with_maintypes(["Creature"])
            .with_subtypes(["Bear"])
            .with_power_toughness(2, 2)
    }

    #[test]
    fn test_vanilla_creature_is_valid() {
        assert_eq!(CardValidator::standard().validate(&bear()), Ok(()));
    }

    #[test]
    fn test_unknown_rarity() {
        let card = Card::new("Odd", "legendary").with_maintypes(["Land"]);
        assert!(matches!(
            CardValidator::standard().validate(&card),
            Err(ValidationError::UnknownRarity { .. })
        ));
    }

    #[test]
    fn test_creature_without_stats() {
        let mut card = bear();
        card.power_toughness = None;
        assert_eq!(
            CardValidator::standard().validate(&card),
            Err(ValidationError::InconsistentPowerToughness {
                name: "Grizzly Bears".to_string()
            })
        );
    }

    #[test]
    fn test_vehicle_may_have_stats() {
        let card = Card::new("Smuggler's Copter", "rare")
            .with_maintypes(["Artifact"])
            .with_subtypes(["Vehicle"])
            .with_power_toughness(3, 3)
            .with_text("Crew 1");
        assert_eq!(CardValidator::standard().validate(&card), Ok(()));
    }

    #[test]
    fn test_textless_sorcery_is_invalid() {
        let card = Card::new("Blank", "common").with_maintypes(["Sorcery"]);
        assert!(matches!(
            CardValidator::standard().validate(&card),
            Err(ValidationError::MissingText { .. })
        ));
    }

    #[test]
    fn test_bad_cost() {
        let card = bear().with_cost("{1}{Purple}");
        assert!(matches!(
            CardValidator::standard().validate(&card),
            Err(ValidationError::MalformedCost { .. })
        ));
    }

    #[test]
    fn test_num_sides_mismatch() {
        let mut card = bear();
        card.num_sides = 2;
        assert!(matches!(
            CardValidator::standard().validate(&card),
            Err(ValidationError::InvalidSides { .. })
        ));
    }

    #[test]
    fn test_back_face_is_checked() {
        let mut card = bear();
        card.attach_side(Side::B, Card::new("", "common")).unwrap();
        assert_eq!(
            CardValidator::standard().validate(&card),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn test_exclusion_is_last_and_overridable() {
        let mut card = bear();
        card.json_fields = json!({"setCode": "TST", "layout": "token"})
            .as_object()
            .cloned();
        let err = CardValidator::standard().validate(&card).unwrap_err();
        assert!(err.is_exclusion());

        let permissive = CardValidator::standard().with_policy(NoExclusions);
        assert_eq!(permissive.validate(&card), Ok(()));
    }
}
