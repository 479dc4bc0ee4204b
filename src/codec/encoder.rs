//! Card record to AI-format encoder

use std::collections::BTreeSet;

use tracing::trace;

use super::format::{self, FIELD_SEP, FACE_SEP, LIST_SEP, NEWLINE, THIS_NAME};
use super::symbols::{self, ManaToken, SymbolEntry, SymbolError, SymbolKind, SymbolTable};
use crate::models::Card;
use crate::reminder::ReminderStripper;

/// Errors raised while encoding a card
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error("Field '{field}' of '{name}' contains reserved character U+{:04X}", *.ch as u32)]
    ReservedCharacter {
        name: String,
        field: &'static str,
        ch: char,
    },
    #[error("Field '{field}' of '{name}' contains an empty type entry")]
    EmptyTypeEntry { name: String, field: &'static str },
    #[error("Card '{0}' has a gap between its sides")]
    NonContiguousSides(String),
    #[error("Face '{0}' owns sides of its own")]
    FaceOwnsSides(String),
    #[error("Rarity '{0}' is not a known rarity")]
    UnknownRarity(String),
}

/// Encodes validated cards into the single-line AI format
#[derive(Debug, Clone)]
pub struct Encoder<'a> {
    table: &'a SymbolTable,
    stripper: Option<ReminderStripper>,
    keywords: Vec<&'a SymbolEntry>,
}

impl Encoder<'static> {
    /// Encoder over the standard table with reminder stripping enabled
    pub fn standard() -> Self {
        Encoder::new(SymbolTable::standard()).with_reminder_stripping(ReminderStripper::standard())
    }
}

impl<'a> Encoder<'a> {
    /// Encoder that leaves reminder text alone
    pub fn new(table: &'a SymbolTable) -> Self {
        let mut keywords: Vec<&SymbolEntry> = table.entries_of(SymbolKind::Keyword).collect();
        keywords.sort_by(|a, b| b.source.len().cmp(&a.source.len()));
        Self {
            table,
            stripper: None,
            keywords,
        }
    }

    pub fn with_reminder_stripping(mut self, stripper: ReminderStripper) -> Self {
        self.stripper = Some(stripper);
        self
    }

    pub fn without_reminder_stripping(mut self) -> Self {
        self.stripper = None;
        self
    }

    pub fn table(&self) -> &'a SymbolTable {
        self.table
    }

    /// Apply the lossy normalizations that encoding performs.
    ///
    /// The result is what decoding the encoded card gives back, so the
    /// round-trip verifier compares against this rather than the input.
    pub fn unreversible_modifications(&self, card: &Card) -> Card {
        let mut card = card.clone();
        card.for_each_face_mut(|face| {
            face.main_text = face
                .main_text
                .take()
                .and_then(|text| self.normalize_text(&text));
            if face.cost.as_deref().is_some_and(str::is_empty) {
                face.cost = None;
            }
        });
        card
    }

    fn normalize_text(&self, text: &str) -> Option<String> {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let text = match &self.stripper {
            Some(stripper) => stripper.strip(&text),
            None => text,
        };
        let lines: Vec<&str> = text
            .split('\n')
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Encode a card, applying the unreversible modifications first
    pub fn encode(&self, card: &Card) -> Result<String, EncodeError> {
        let card = self.unreversible_modifications(card);
        self.encode_exact(&card)
    }

    /// Encode a card as-is
    pub fn encode_exact(&self, card: &Card) -> Result<String, EncodeError> {
        if !card.sides_are_contiguous() {
            return Err(EncodeError::NonContiguousSides(card.name.clone()));
        }

        let mut out = String::new();
        self.encode_face(card, &mut out)?;
        for (side, face) in card.sides() {
            if face.has_side_links() {
                return Err(EncodeError::FaceOwnsSides(face.name.clone()));
            }
            trace!(card = %card.name, %side, "encoding side");
            out.push(FACE_SEP);
            self.encode_face(face, &mut out)?;
        }
        Ok(out)
    }

    fn encode_face(&self, face: &Card, out: &mut String) -> Result<(), EncodeError> {
        check_plain(&face.name, "name", &face.name)?;
        if let Some(cost) = &face.cost {
            check_plain(cost, "cost", &face.name)?;
        }
        if let Some(text) = &face.main_text {
            check_reserved(text, "main_text", &face.name)?;
        }

        out.push(FIELD_SEP);
        out.push_str(&face.name);
        out.push(FIELD_SEP);
        push_type_list(&face.supertypes, "supertypes", &face.name, out)?;
        out.push(FIELD_SEP);
        push_type_list(&face.maintypes, "maintypes", &face.name, out)?;
        out.push(FIELD_SEP);
        push_type_list(&face.subtypes, "subtypes", &face.name, out)?;
        out.push(FIELD_SEP);
        if let Some(cost) = &face.cost {
            self.push_cost(cost, out)?;
        }
        out.push(FIELD_SEP);
        if let Some((power, toughness)) = face.power_toughness {
            format::push_number(out, power.into());
            format::push_number(out, toughness.into());
        }
        out.push(FIELD_SEP);
        if let Some(loyalty) = face.loyalty {
            format::push_number(out, loyalty.into());
        }
        out.push(FIELD_SEP);
        if !self.table.is_known_rarity(&face.rarity) {
            return Err(EncodeError::UnknownRarity(face.rarity.clone()));
        }
        out.push(self.table.encode(&face.rarity)?);
        out.push(FIELD_SEP);
        if let Some(text) = &face.main_text {
            out.push_str(&self.encode_text(text, &face.name));
        }
        out.push(FIELD_SEP);
        Ok(())
    }

    fn push_cost(&self, cost: &str, out: &mut String) -> Result<(), EncodeError> {
        for token in self.table.tokenize_cost(cost)? {
            match token {
                ManaToken::Symbol(c) => out.push(c),
                ManaToken::Generic(n) => format::push_number(out, n),
            }
        }
        Ok(())
    }

    /// Encode rules text: own name, line breaks, brace groups, then keywords
    pub fn encode_text(&self, text: &str, name: &str) -> String {
        let text = if name.is_empty() {
            text.to_string()
        } else {
            text.replace(name, &THIS_NAME.to_string())
        };
        let text = text.replace('\n', &NEWLINE.to_string());

        let mut braced = String::with_capacity(text.len());
        let mut cursor = 0;
        for group in symbols::mana_groups(&text) {
            braced.push_str(&text[cursor..group.start()]);
            match self.table.classify_group(group.as_str()) {
                Ok(ManaToken::Symbol(c)) => braced.push(c),
                Ok(ManaToken::Generic(n)) => format::push_number(&mut braced, n),
                Err(_) => braced.push_str(group.as_str()),
            }
            cursor = group.end();
        }
        braced.push_str(&text[cursor..]);

        self.substitute_keywords(&braced)
    }

    fn substitute_keywords(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut after_word = false;
        while let Some(c) = rest.chars().next() {
            if !after_word {
                let hit = self.keywords.iter().find(|kw| {
                    rest.starts_with(kw.source)
                        && !rest[kw.source.len()..].chars().next().is_some_and(is_word_char)
                });
                if let Some(kw) = hit {
                    out.push(kw.encoded);
                    rest = &rest[kw.source.len()..];
                    continue;
                }
            }
            out.push(c);
            after_word = is_word_char(c);
            rest = &rest[c.len_utf8()..];
        }
        out
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn check_reserved(value: &str, field: &'static str, name: &str) -> Result<(), EncodeError> {
    match value.chars().find(|&c| symbols::is_private_use(c)) {
        Some(ch) => Err(EncodeError::ReservedCharacter {
            name: name.to_string(),
            field,
            ch,
        }),
        None => Ok(()),
    }
}

fn check_plain(value: &str, field: &'static str, name: &str) -> Result<(), EncodeError> {
    check_reserved(value, field, name)?;
    match value.chars().find(|&c| c == '\n' || c == '\r') {
        Some(ch) => Err(EncodeError::ReservedCharacter {
            name: name.to_string(),
            field,
            ch,
        }),
        None => Ok(()),
    }
}

fn push_type_list(
    types: &BTreeSet<String>,
    field: &'static str,
    name: &str,
    out: &mut String,
) -> Result<(), EncodeError> {
    for (idx, entry) in types.iter().enumerate() {
        if entry.is_empty() {
            return Err(EncodeError::EmptyTypeEntry {
                name: name.to_string(),
                field,
            });
        }
        check_plain(entry, field, name)?;
        if idx > 0 {
            out.push(LIST_SEP);
        }
        out.push_str(entry);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::format::{UNARY_COUNTER, UNARY_MARKER};

    fn bear() -> Card {
        Card::new("Grizzly Bears", "common")
            .with_cost("{1}{G}")
            .with_maintypes(["Creature"])
            .with_subtypes(["Bear"])
            .with_power_toughness(2, 2)
    }

    #[test]
    fn test_face_has_nine_fields() {
        let encoded = Encoder::standard().encode(&bear()).unwrap();
        assert_eq!(encoded.matches(FIELD_SEP).count(), 10);
        assert!(encoded.starts_with(FIELD_SEP));
        assert!(encoded.ends_with(FIELD_SEP));
        let fields: Vec<&str> = encoded.split(FIELD_SEP).collect();
        assert_eq!(fields[1], "Grizzly Bears");
        assert_eq!(fields[3], "Creature");
        assert_eq!(fields[4], "Bear");
        assert_eq!(fields[5], format!("{UNARY_MARKER}{UNARY_COUNTER}\u{E024}"));
    }

    #[test]
    fn test_text_substitutions() {
        let encoder = Encoder::new(SymbolTable::standard());
        let encoded = encoder.encode_text(
            "Flying\n{T}: Grizzly Bears deals 1 damage.",
            "Grizzly Bears",
        );
        assert_eq!(
            encoded,
            format!("\u{E0C0}{NEWLINE}\u{E02A}: {THIS_NAME} deals 1 damage.")
        );
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        let encoder = Encoder::new(SymbolTable::standard());
        assert_eq!(encoder.encode_text("Flashback {R}", "X"), "\u{E0D1} \u{E023}");
        assert_eq!(encoder.encode_text("Reflying", "X"), "Reflying");
    }

    #[test]
    fn test_unknown_brace_group_left_literal() {
        let encoder = Encoder::new(SymbolTable::standard());
        assert_eq!(encoder.encode_text("Pay {K}.", "X"), "Pay {K}.");
    }

    #[test]
    fn test_unreversible_modifications() {
        let encoder = Encoder::standard();
        let card = bear().with_text(
            "Flying (This creature can't be blocked except by creatures with flying or reach.)\r\n\r\nTrample  ",
        );
        let modified = encoder.unreversible_modifications(&card);
        assert_eq!(modified.main_text.as_deref(), Some("Flying\nTrample"));

        let blank = bear().with_text("   \n");
        assert_eq!(encoder.unreversible_modifications(&blank).main_text, None);
    }

    #[test]
    fn test_reserved_character_rejected() {
        let card = Card::new("Bad\u{E000}Name", "common");
        assert!(matches!(
            Encoder::standard().encode(&card),
            Err(EncodeError::ReservedCharacter { field: "name", .. })
        ));
    }

    #[test]
    fn test_unknown_cost_symbol() {
        let card = bear().with_cost("{1}{K}");
        assert_eq!(
            Encoder::standard().encode(&card),
            Err(EncodeError::Symbol(SymbolError::UnknownSymbol("{K}".to_string())))
        );
    }

    #[test]
    fn test_sides_joined_by_face_separator() {
        let mut card = Card::new("Front", "rare").with_maintypes(["Sorcery"]);
        card.attach_side(crate::models::Side::B, Card::new("Back", "rare"))
            .unwrap();
        let encoded = Encoder::standard().encode(&card).unwrap();
        assert_eq!(encoded.matches(FACE_SEP).count(), 1);
    }
}
