//! Card record in the internal format
//!
//! A `Card` is either a primary face, which may own up to four attached sides
//! (`b_side` .. `e_side`), or a non-primary face stored inside one of those
//! slots. Non-primary faces never own sides themselves, so the whole dataset
//! is a forest that is exactly one level deep. The back-reference from a side
//! to its primary is not stored here; see [`super::faces::FaceIndex`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Face letter of a (possibly multi-faced) card
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
    C,
    D,
    E,
}

impl Side {
    /// Sides that can be attached to a primary, in attachment order
    pub const LINKED: [Side; 4] = [Side::B, Side::C, Side::D, Side::E];

    /// Parse a source side letter (`"a"` .. `"e"`)
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "a" => Some(Side::A),
            "b" => Some(Side::B),
            "c" => Some(Side::C),
            "d" => Some(Side::D),
            "e" => Some(Side::E),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Side::A => 'a',
            Side::B => 'b',
            Side::C => 'c',
            Side::D => 'd',
            Side::E => 'e',
        }
    }

    /// Name of the record field holding this side
    pub fn field_name(&self) -> &'static str {
        match self {
            Side::A => "a_side",
            Side::B => "b_side",
            Side::C => "c_side",
            Side::D => "d_side",
            Side::E => "e_side",
        }
    }

    /// Inverse of [`Side::field_name`] for the linked sides
    pub fn from_field_name(field: &str) -> Option<Self> {
        Side::LINKED.into_iter().find(|side| side.field_name() == field)
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, Side::A)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Error returned when a face cannot be attached to a primary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachError {
    #[error("side '{0}' cannot be attached to a primary")]
    NotLinkable(Side),
    #[error("{} is already set", .0.field_name())]
    SlotTaken(Side),
    #[error("face '{0}' already owns sides and cannot be attached")]
    FaceOwnsSides(String),
}

/// Normalized card record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_toughness: Option<(i32, i32)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loyalty: Option<i32>,
    pub rarity: String,
    #[serde(default)]
    pub maintypes: BTreeSet<String>,
    #[serde(default)]
    pub subtypes: BTreeSet<String>,
    #[serde(default)]
    pub supertypes: BTreeSet<String>,
    pub num_sides: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b_side: Option<Box<Card>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_side: Option<Box<Card>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d_side: Option<Box<Card>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_side: Option<Box<Card>>,
    /// Source database id, used to build the face index. Not encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Snapshot of the raw source fields, kept for inclusion filtering only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_fields: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Card {
    /// Create a single-faced card with the given name and rarity
    pub fn new(name: impl Into<String>, rarity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rarity: rarity.into(),
            num_sides: 1,
            ..Default::default()
        }
    }

    pub fn with_cost(mut self, cost: impl Into<String>) -> Self {
        self.cost = Some(cost.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.main_text = Some(text.into());
        self
    }

    pub fn with_power_toughness(mut self, power: i32, toughness: i32) -> Self {
        self.power_toughness = Some((power, toughness));
        self
    }

    pub fn with_loyalty(mut self, loyalty: i32) -> Self {
        self.loyalty = Some(loyalty);
        self
    }

    pub fn with_maintypes<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.maintypes = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_subtypes<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtypes = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_supertypes<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supertypes = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// Borrow the face stored under `side`. `Side::A` is never stored.
    pub fn side(&self, side: Side) -> Option<&Card> {
        match side {
            Side::A => None,
            Side::B => self.b_side.as_deref(),
            Side::C => self.c_side.as_deref(),
            Side::D => self.d_side.as_deref(),
            Side::E => self.e_side.as_deref(),
        }
    }

    fn slot_mut(&mut self, side: Side) -> Option<&mut Option<Box<Card>>> {
        match side {
            Side::A => None,
            Side::B => Some(&mut self.b_side),
            Side::C => Some(&mut self.c_side),
            Side::D => Some(&mut self.d_side),
            Side::E => Some(&mut self.e_side),
        }
    }

    /// Attach `face` under `side`. Each slot is set at most once and the
    /// attached face must not own sides of its own.
    pub fn attach_side(&mut self, side: Side, face: Card) -> Result<(), AttachError> {
        if face.has_side_links() {
            return Err(AttachError::FaceOwnsSides(face.name));
        }
        let slot = self.slot_mut(side).ok_or(AttachError::NotLinkable(side))?;
        if slot.is_some() {
            return Err(AttachError::SlotTaken(side));
        }
        *slot = Some(Box::new(face));
        self.num_sides = 1 + self.linked_side_count() as u8;
        Ok(())
    }

    /// Attached sides in b, c, d, e order
    pub fn sides(&self) -> impl Iterator<Item = (Side, &Card)> {
        Side::LINKED
            .into_iter()
            .filter_map(move |side| self.side(side).map(|card| (side, card)))
    }

    /// Apply `f` to the primary and then to every attached side
    pub fn for_each_face_mut(&mut self, mut f: impl FnMut(&mut Card)) {
        f(self);
        for slot in [
            &mut self.b_side,
            &mut self.c_side,
            &mut self.d_side,
            &mut self.e_side,
        ] {
            if let Some(face) = slot.as_deref_mut() {
                f(face);
            }
        }
    }

    pub fn linked_side_count(&self) -> usize {
        self.sides().count()
    }

    pub fn has_side_links(&self) -> bool {
        self.linked_side_count() > 0
    }

    /// Sides must be filled contiguously from `b_side`
    pub fn sides_are_contiguous(&self) -> bool {
        let mut gap = false;
        for side in Side::LINKED {
            match (self.side(side).is_some(), gap) {
                (true, true) => return false,
                (false, _) => gap = true,
                _ => {}
            }
        }
        true
    }

    /// Whether any of the declared types is in `types`
    pub fn has_any_type(&self, types: &BTreeSet<String>) -> bool {
        self.maintypes
            .iter()
            .chain(self.subtypes.iter())
            .chain(self.supertypes.iter())
            .any(|t| types.contains(t))
    }

    /// Set code recorded in the retained source snapshot, if any
    pub fn source_set_code(&self) -> Option<&str> {
        self.json_str("setCode")
    }

    /// Layout recorded in the retained source snapshot, if any
    pub fn source_layout(&self) -> Option<&str> {
        self.json_str("layout")
    }

    pub fn json_str(&self, key: &str) -> Option<&str> {
        self.json_fields
            .as_ref()
            .and_then(|fields| fields.get(key))
            .and_then(|value| value.as_str())
    }

    pub fn json_flag(&self, key: &str) -> bool {
        self.json_fields
            .as_ref()
            .and_then(|fields| fields.get(key))
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }
}

/// Fields compared by the round-trip verifier, in report order.
///
/// `uuid` and `json_fields` are not encoded and so not compared.
pub const COMPARED_FIELDS: [&str; 14] = [
    "name",
    "cost",
    "main_text",
    "power_toughness",
    "loyalty",
    "rarity",
    "maintypes",
    "subtypes",
    "supertypes",
    "num_sides",
    "b_side",
    "c_side",
    "d_side",
    "e_side",
];

/// Render one compared field of a card for mismatch reports
pub fn field_repr(card: &Card, field: &str) -> String {
    fn opt<T: fmt::Debug>(value: &Option<T>) -> String {
        match value {
            Some(v) => format!("{v:?}"),
            None => "<absent>".to_string(),
        }
    }
    match field {
        "name" => format!("{:?}", card.name),
        "cost" => opt(&card.cost),
        "main_text" => opt(&card.main_text),
        "power_toughness" => opt(&card.power_toughness),
        "loyalty" => opt(&card.loyalty),
        "rarity" => format!("{:?}", card.rarity),
        "maintypes" => format!("{:?}", card.maintypes),
        "subtypes" => format!("{:?}", card.subtypes),
        "supertypes" => format!("{:?}", card.supertypes),
        "num_sides" => card.num_sides.to_string(),
        side_field => match Side::from_field_name(side_field) {
            Some(side) => match card.side(side) {
                Some(face) => format!("<face {:?}>", face.name),
                None => "<absent>".to_string(),
            },
            None => String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(name: &str) -> Card {
        Card::new(name, "rare").with_maintypes(["Creature"])
    }

    #[test]
    fn test_attach_side_sets_num_sides() {
        let mut card = face("Delver of Secrets");
        card.attach_side(Side::B, face("Insectile Aberration"))
            .unwrap();

        assert_eq!(card.num_sides, 2);
        assert_eq!(card.side(Side::B).unwrap().name, "Insectile Aberration");
        assert!(card.side(Side::C).is_none());
    }

    #[test]
    fn test_attach_side_rejects_taken_slot() {
        let mut card = face("Front");
        card.attach_side(Side::B, face("Back")).unwrap();
        let err = card.attach_side(Side::B, face("Other")).unwrap_err();
        assert_eq!(err, AttachError::SlotTaken(Side::B));
        assert_eq!(card.num_sides, 2);
    }

    #[test]
    fn test_attach_side_rejects_primary_letter_and_nested_faces() {
        let mut card = face("Front");
        assert_eq!(
            card.attach_side(Side::A, face("Again")).unwrap_err(),
            AttachError::NotLinkable(Side::A)
        );

        let mut nested = face("Middle");
        nested.attach_side(Side::B, face("Leaf")).unwrap();
        assert!(matches!(
            card.attach_side(Side::B, nested),
            Err(AttachError::FaceOwnsSides(_))
        ));
    }

    #[test]
    fn test_sides_contiguity() {
        let mut card = face("Front");
        assert!(card.sides_are_contiguous());
        card.attach_side(Side::C, face("Third")).unwrap();
        assert!(!card.sides_are_contiguous());
        card.attach_side(Side::B, face("Second")).unwrap();
        assert!(card.sides_are_contiguous());
        assert_eq!(
            card.sides().map(|(s, _)| s).collect::<Vec<_>>(),
            vec![Side::B, Side::C]
        );
    }

    #[test]
    fn test_side_letters() {
        assert_eq!(Side::from_letter("c"), Some(Side::C));
        assert_eq!(Side::from_letter("f"), None);
        assert_eq!(Side::D.field_name(), "d_side");
        assert!(Side::A.is_primary());
    }

    #[test]
    fn test_field_repr() {
        let card = face("Grizzly Bears").with_power_toughness(2, 2);
        assert_eq!(field_repr(&card, "power_toughness"), "(2, 2)");
        assert_eq!(field_repr(&card, "cost"), "<absent>");
        assert_eq!(field_repr(&card, "rarity"), "\"rare\"");
    }
}
