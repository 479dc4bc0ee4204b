//! MTGJSON importer
//!
//! Converts an `AllPrintings.json` style dump (`data` keyed by set code, each
//! set holding a `cards` list) into normalized [`Card`] records. Every card is
//! parsed on its own: a malformed entry is recorded as a [`CardFailure`] and
//! the rest of the set carries on.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::ImportError;
use crate::models::{Card, Side};

/// Per-card normalization failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Malformed card object: {0}")]
    MalformedCard(String),
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Card '{name}' has only one of power and toughness")]
    InconsistentPowerToughness { name: String },
    #[error("Card '{name}' has non-numeric {field} '{value}'")]
    NonNumericStat {
        name: String,
        field: &'static str,
        value: String,
    },
    #[error("Card '{name}' has unknown side '{side}'")]
    UnknownSide { name: String, side: String },
    #[error("Face '{name}' ({uuid}) is not claimed by any primary in its set")]
    DanglingFaceReference { name: String, uuid: String },
    #[error("Face '{name}' cannot be attached: {reason}")]
    DuplicateFace { name: String, reason: String },
}

/// Top-level database document
#[derive(Debug, Clone, Deserialize)]
pub struct RawDatabase {
    #[serde(default)]
    pub meta: Option<Value>,
    pub data: BTreeMap<String, RawSet>,
}

/// One set object. Cards stay as raw JSON so a bad entry only fails itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSet {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "type")]
    pub set_type: Option<String>,
    #[serde(default)]
    pub cards: Vec<Value>,
}

/// The subset of card keys the normalizer reads. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCard {
    pub name: Option<String>,
    pub face_name: Option<String>,
    pub mana_cost: Option<String>,
    pub text: Option<String>,
    pub original_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub loyalty: Option<String>,
    pub rarity: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub subtypes: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    pub side: Option<String>,
    #[serde(default)]
    pub other_face_ids: Vec<String>,
    pub uuid: Option<String>,
    pub layout: Option<String>,
    pub set_code: Option<String>,
    pub is_funny: Option<bool>,
}

/// Normalizer options
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Keep a snapshot of the raw source object on each record
    pub retain_json_fields: bool,
    /// Set types whose codes are reported for later exclusion
    pub excluded_set_types: BTreeSet<String>,
}

impl NormalizeOptions {
    pub fn with_retain_json_fields(mut self, retain: bool) -> Self {
        self.retain_json_fields = retain;
        self
    }

    pub fn with_excluded_set_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_set_types = types.into_iter().map(Into::into).collect();
        self
    }
}

/// A card that could not be normalized
#[derive(Debug, Clone, PartialEq)]
pub struct CardFailure {
    pub set_code: String,
    pub index: usize,
    pub name: Option<String>,
    pub error: SchemaError,
}

/// Output of a normalization pass
#[derive(Debug, Clone, Default)]
pub struct NormalizeResult {
    /// Primary records, in set-code order then source order
    pub cards: Vec<Card>,
    /// Codes of sets whose type is in the configured exclusion set
    pub excluded_set_codes: BTreeSet<String>,
    /// Per-card failures
    pub errors: Vec<CardFailure>,
    pub sets_seen: usize,
    /// Card objects read, faces included
    pub raw_cards: usize,
}

impl NormalizeResult {
    /// Number of faces across all primary records
    pub fn face_count(&self) -> usize {
        self.cards.iter().map(|c| c.num_sides as usize).sum()
    }
}

/// A non-primary face waiting for its owner
struct PendingFace {
    index: usize,
    side: Side,
    card: Card,
    other_face_ids: Vec<String>,
}

/// MTGJSON database importer
#[derive(Debug, Default)]
pub struct MtgJsonImporter {
    options: NormalizeOptions,
}

impl MtgJsonImporter {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Read and parse a database file
    pub fn load_file(&self, path: &Path) -> Result<RawDatabase, ImportError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ImportError::IoError(format!("{}: {e}", path.display())))?;
        self.parse(&content)
    }

    /// Parse database JSON text
    ///
    /// # Arguments
    ///
    /// * `content` - The full database document.
    ///
    /// # Returns
    ///
    /// The raw database, or a parse error when the top-level shape is wrong.
    pub fn parse(&self, content: &str) -> Result<RawDatabase, ImportError> {
        serde_json::from_str(content).map_err(|e| ImportError::ParseError(e.to_string()))
    }

    /// Parse an already decoded JSON value
    pub fn parse_value(&self, value: Value) -> Result<RawDatabase, ImportError> {
        serde_json::from_value(value).map_err(|e| ImportError::ParseError(e.to_string()))
    }

    /// Normalize every set of the database
    pub fn normalize(&self, db: &RawDatabase) -> NormalizeResult {
        let mut result = NormalizeResult::default();

        for (code, set) in &db.data {
            result.sets_seen += 1;
            if let Some(set_type) = &set.set_type {
                if self.options.excluded_set_types.contains(set_type) {
                    debug!(set = %code, set_type = %set_type, "Set type marked for exclusion");
                    result.excluded_set_codes.insert(code.clone());
                }
            }
            self.normalize_set(code, set, &mut result);
        }

        info!(
            sets = result.sets_seen,
            cards = result.cards.len(),
            failures = result.errors.len(),
            "Normalization complete"
        );
        result
    }

    fn normalize_set(&self, code: &str, set: &RawSet, result: &mut NormalizeResult) {
        let mut primaries: Vec<Card> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();
        let mut pending: Vec<PendingFace> = Vec::new();

        for (index, value) in set.cards.iter().enumerate() {
            result.raw_cards += 1;
            let fail = |error: SchemaError| CardFailure {
                set_code: code.to_string(),
                index,
                name: value
                    .get("faceName")
                    .or_else(|| value.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                error,
            };

            let raw: RawCard = match serde_json::from_value(value.clone()) {
                Ok(raw) => raw,
                Err(e) => {
                    result.errors.push(fail(SchemaError::MalformedCard(e.to_string())));
                    continue;
                }
            };

            let side = match raw.side.as_deref() {
                None => Side::A,
                Some(letter) => match Side::from_letter(letter) {
                    Some(side) => side,
                    None => {
                        result.errors.push(fail(SchemaError::UnknownSide {
                            name: display_name(&raw),
                            side: letter.to_string(),
                        }));
                        continue;
                    }
                },
            };

            let card = match self.convert(code, value, &raw) {
                Ok(card) => card,
                Err(error) => {
                    debug!(set = %code, index, error = %error, "Dropping card");
                    result.errors.push(fail(error));
                    continue;
                }
            };

            if side.is_primary() {
                if let Some(id) = &card.uuid {
                    by_id.insert(id.clone(), primaries.len());
                }
                primaries.push(card);
            } else {
                pending.push(PendingFace {
                    index,
                    side,
                    card,
                    other_face_ids: raw.other_face_ids,
                });
            }
        }

        for face in pending {
            let owner = face
                .other_face_ids
                .iter()
                .find_map(|id| by_id.get(id).copied());
            let error = match owner {
                Some(owner) => match primaries[owner].attach_side(face.side, face.card.clone()) {
                    Ok(()) => continue,
                    Err(e) => SchemaError::DuplicateFace {
                        name: face.card.name.clone(),
                        reason: e.to_string(),
                    },
                },
                None => SchemaError::DanglingFaceReference {
                    name: face.card.name.clone(),
                    uuid: face.card.uuid.clone().unwrap_or_default(),
                },
            };
            debug!(set = %code, index = face.index, error = %error, "Dropping face");
            result.errors.push(CardFailure {
                set_code: code.to_string(),
                index: face.index,
                name: Some(face.card.name),
                error,
            });
        }

        result.cards.extend(primaries);
    }

    /// Map one raw card onto a record
    fn convert(&self, code: &str, value: &Value, raw: &RawCard) -> Result<Card, SchemaError> {
        let name = raw
            .face_name
            .as_deref()
            .or(raw.name.as_deref())
            .filter(|n| !n.is_empty())
            .ok_or(SchemaError::MissingField("name"))?;
        let rarity = raw
            .rarity
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or(SchemaError::MissingField("rarity"))?;

        let mut card = Card::new(name, rarity);
        card.cost = non_empty(raw.mana_cost.as_deref());
        card.main_text = non_empty(raw.text.as_deref())
            .or_else(|| non_empty(raw.original_text.as_deref()));
        card.maintypes = clean_types(&raw.types);
        card.subtypes = clean_types(&raw.subtypes);
        card.supertypes = clean_types(&raw.supertypes);
        card.uuid = raw.uuid.clone();

        card.power_toughness = match (&raw.power, &raw.toughness) {
            (Some(p), Some(t)) => Some((
                parse_stat(name, "power", p)?,
                parse_stat(name, "toughness", t)?,
            )),
            (None, None) => None,
            _ => {
                return Err(SchemaError::InconsistentPowerToughness {
                    name: name.to_string(),
                });
            }
        };
        card.loyalty = raw
            .loyalty
            .as_deref()
            .map(|l| parse_stat(name, "loyalty", l))
            .transpose()?;

        if self.options.retain_json_fields {
            if let Value::Object(map) = value {
                let mut snapshot: Map<String, Value> = map.clone();
                snapshot
                    .entry("setCode")
                    .or_insert_with(|| Value::String(code.to_string()));
                card.json_fields = Some(snapshot);
            }
        }

        Ok(card)
    }
}

fn display_name(raw: &RawCard) -> String {
    raw.face_name
        .clone()
        .or_else(|| raw.name.clone())
        .unwrap_or_default()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn clean_types(types: &[String]) -> BTreeSet<String> {
    types
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_stat(name: &str, field: &'static str, value: &str) -> Result<i32, SchemaError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| SchemaError::NonNumericStat {
            name: name.to_string(),
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn importer() -> MtgJsonImporter {
        MtgJsonImporter::new(NormalizeOptions::default().with_retain_json_fields(true))
    }

    fn db(cards: Value) -> RawDatabase {
        importer()
            .parse_value(json!({
                "meta": {"version": "5.2.2"},
                "data": {"TST": {"name": "Test Set", "code": "TST", "type": "expansion", "cards": cards}}
            }))
            .unwrap()
    }

    #[test]
    fn test_face_name_preferred_and_text_fallback() {
        let result = importer().normalize(&db(json!([{
            "name": "Fire // Ice",
            "faceName": "Fire",
            "originalText": "Fire deals 2 damage divided as you choose.",
            "rarity": "uncommon",
            "types": ["Instant"],
            "manaCost": "",
        }])));
        let card = &result.cards[0];
        assert_eq!(card.name, "Fire");
        assert_eq!(
            card.main_text.as_deref(),
            Some("Fire deals 2 damage divided as you choose.")
        );
        assert_eq!(card.cost, None);
        assert_eq!(card.source_set_code(), Some("TST"));
    }

    #[test]
    fn test_non_numeric_power_is_schema_error() {
        let result = importer().normalize(&db(json!([{
            "name": "Tarmogoyf", "rarity": "mythic", "types": ["Creature"],
            "power": "*", "toughness": "1+*"
        }])));
        assert!(result.cards.is_empty());
        assert!(matches!(
            result.errors[0].error,
            SchemaError::NonNumericStat { field: "power", .. }
        ));
    }

    #[test]
    fn test_missing_rarity() {
        let result = importer().normalize(&db(json!([{"name": "Nameless"}])));
        assert_eq!(result.errors[0].error, SchemaError::MissingField("rarity"));
        assert_eq!(result.errors[0].name.as_deref(), Some("Nameless"));
    }

    #[test]
    fn test_unknown_side_letter() {
        let result = importer().normalize(&db(json!([{
            "name": "Odd", "rarity": "rare", "side": "z"
        }])));
        assert!(matches!(result.errors[0].error, SchemaError::UnknownSide { .. }));
    }

    #[test]
    fn test_malformed_card_object() {
        let result = importer().normalize(&db(json!([{"name": 42, "rarity": "rare"}])));
        assert!(matches!(result.errors[0].error, SchemaError::MalformedCard(_)));
        assert_eq!(result.raw_cards, 1);
    }

    #[test]
    fn test_excluded_set_type_tracked_not_dropped() {
        let importer = MtgJsonImporter::new(
            NormalizeOptions::default().with_excluded_set_types(["funny"]),
        );
        let db = importer
            .parse_value(json!({"data": {"UNH": {"type": "funny", "cards": [
                {"name": "Gleemax", "rarity": "rare", "types": ["Artifact"]}
            ]}}}))
            .unwrap();
        let result = importer.normalize(&db);
        assert_eq!(result.cards.len(), 1);
        assert!(result.excluded_set_codes.contains("UNH"));
        assert!(result.cards[0].json_fields.is_none());
    }
}
