//! AI-format to card record decoder
//!
//! Decoding generated text is expected to fail now and then. Errors are
//! reported per sample and never abort a batch.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::format::{
    self, FACE_SEP, FIELD_COUNT, FIELD_SEP, FaceField, LIST_SEP, NEWLINE, NumberError, THIS_NAME,
};
use super::symbols::{self, SymbolError, SymbolKind, SymbolTable};
use crate::models::{Card, Side};

static FACE_SEP_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("{FACE_SEP}{{2,}}")).unwrap());

/// Errors raised while decoding one encoded card
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

impl From<SymbolError> for DecodeError {
    fn from(err: SymbolError) -> Self {
        match err {
            SymbolError::UnknownSymbol(token) => DecodeError::UnknownSymbol(token),
            other => DecodeError::MalformedEncoding(other.to_string()),
        }
    }
}

impl DecodeError {
    fn in_field(field: FaceField, err: NumberError) -> Self {
        DecodeError::MalformedEncoding(format!("{field}: {err}"))
    }
}

/// Best-effort repair of generated text before strict parsing.
///
/// Trims surrounding whitespace, drops carriage returns, collapses repeated
/// face separators, removes face separators at either edge and adds a missing
/// leading or trailing field separator to each face. Field contents are never
/// invented.
pub fn error_correct(text: &str) -> String {
    let face_sep = FACE_SEP.to_string();
    let text = text.trim().replace('\r', "");
    let text = FACE_SEP_RUN.replace_all(&text, face_sep.as_str());
    let text = text.trim_matches(FACE_SEP);

    text.split(FACE_SEP)
        .map(|face| {
            let mut fixed = String::with_capacity(face.len() + 2);
            if !face.starts_with(FIELD_SEP) {
                fixed.push(FIELD_SEP);
            }
            fixed.push_str(face);
            if !face.ends_with(FIELD_SEP) || face.chars().count() == 1 {
                fixed.push(FIELD_SEP);
            }
            fixed
        })
        .collect::<Vec<_>>()
        .join(face_sep.as_str())
}

/// Decodes AI-format strings back into card records
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    table: &'a SymbolTable,
    correct_errors: bool,
}

impl Decoder<'static> {
    pub fn standard() -> Self {
        Decoder::new(SymbolTable::standard())
    }
}

impl<'a> Decoder<'a> {
    /// Strict decoder; no error-correction pre-pass
    pub fn new(table: &'a SymbolTable) -> Self {
        Self {
            table,
            correct_errors: false,
        }
    }

    /// Enable or disable the [`error_correct`] pre-pass
    pub fn with_error_correction(mut self, enabled: bool) -> Self {
        self.correct_errors = enabled;
        self
    }

    pub fn corrects_errors(&self) -> bool {
        self.correct_errors
    }

    pub fn decode(&self, text: &str) -> Result<Card, DecodeError> {
        let corrected;
        let text = if self.correct_errors {
            corrected = error_correct(text);
            corrected.as_str()
        } else {
            text
        };

        if text.is_empty() {
            return Err(DecodeError::MalformedEncoding("empty input".to_string()));
        }
        if text.contains(format::CARD_SEP) {
            return Err(DecodeError::MalformedEncoding(
                "card separator inside a card".to_string(),
            ));
        }

        let faces: Vec<&str> = text.split(FACE_SEP).collect();
        if faces.len() > 1 + Side::LINKED.len() {
            return Err(DecodeError::MalformedEncoding(format!(
                "{} faces, at most {} allowed",
                faces.len(),
                1 + Side::LINKED.len()
            )));
        }

        let mut card = self.decode_face(faces[0])?;
        for (face, side) in faces[1..].iter().zip(Side::LINKED) {
            let face = self.decode_face(face)?;
            card.attach_side(side, face)
                .map_err(|e| DecodeError::MalformedEncoding(e.to_string()))?;
        }
        Ok(card)
    }

    fn decode_face(&self, face: &str) -> Result<Card, DecodeError> {
        let inner = face
            .strip_prefix(FIELD_SEP)
            .and_then(|f| f.strip_suffix(FIELD_SEP))
            .ok_or_else(|| {
                DecodeError::MalformedEncoding("face is not wrapped in field separators".to_string())
            })?;
        let fields: Vec<&str> = inner.split(FIELD_SEP).collect();
        if fields.len() != FIELD_COUNT {
            return Err(DecodeError::MalformedEncoding(format!(
                "expected {FIELD_COUNT} fields, found {}",
                fields.len()
            )));
        }

        let name = fields[0];
        if name.is_empty() {
            return Err(DecodeError::MalformedEncoding("empty name".to_string()));
        }
        check_plain_field(FaceField::Name, name)?;

        let mut card = Card::new(name, self.decode_rarity(fields[7])?);
        card.supertypes = decode_type_list(FaceField::Supertypes, fields[1])?;
        card.maintypes = decode_type_list(FaceField::Maintypes, fields[2])?;
        card.subtypes = decode_type_list(FaceField::Subtypes, fields[3])?;
        card.cost = self.decode_cost(fields[4])?;
        card.power_toughness = decode_power_toughness(fields[5])?;
        card.loyalty = decode_single_number(FaceField::Loyalty, fields[6])?;
        card.main_text = self.decode_text(fields[8], name)?;
        Ok(card)
    }

    fn decode_rarity(&self, field: &str) -> Result<&'static str, DecodeError> {
        let mut chars = field.chars();
        match (chars.next(), chars.next()) {
            (Some(token), None) => match self.table.entry_for_token(token) {
                Some(entry) if entry.kind == SymbolKind::Rarity => Ok(entry.source),
                Some(entry) => Err(DecodeError::MalformedEncoding(format!(
                    "'{}' in rarity field",
                    entry.source
                ))),
                None => Err(unknown_token(token)),
            },
            _ => Err(DecodeError::MalformedEncoding(format!(
                "rarity field must hold one token, found {:?}",
                field
            ))),
        }
    }

    fn decode_cost(&self, field: &str) -> Result<Option<String>, DecodeError> {
        if field.is_empty() {
            return Ok(None);
        }
        let mut cost = String::new();
        let mut rest = field;
        while let Some(c) = rest.chars().next() {
            if format::starts_number(c) {
                let (n, used) = format::read_number(rest)
                    .map_err(|e| DecodeError::in_field(FaceField::Cost, e))?;
                cost.push_str(&format!("{{{n}}}"));
                rest = &rest[used..];
                continue;
            }
            match self.table.entry_for_token(c) {
                Some(entry) if entry.kind == SymbolKind::Mana => cost.push_str(entry.source),
                Some(entry) => {
                    return Err(DecodeError::MalformedEncoding(format!(
                        "'{}' in cost field",
                        entry.source
                    )));
                }
                None if symbols::is_private_use(c) => return Err(unknown_token(c)),
                None => {
                    return Err(DecodeError::MalformedEncoding(format!(
                        "literal '{c}' in cost field"
                    )));
                }
            }
            rest = &rest[c.len_utf8()..];
        }
        Ok(Some(cost))
    }

    fn decode_text(&self, field: &str, name: &str) -> Result<Option<String>, DecodeError> {
        if field.is_empty() {
            return Ok(None);
        }
        let mut text = String::with_capacity(field.len());
        let mut rest = field;
        while let Some(c) = rest.chars().next() {
            if format::starts_number(c) {
                let (n, used) = format::read_number(rest)
                    .map_err(|e| DecodeError::in_field(FaceField::Text, e))?;
                text.push_str(&format!("{{{n}}}"));
                rest = &rest[used..];
                continue;
            }
            match c {
                THIS_NAME => text.push_str(name),
                NEWLINE => text.push('\n'),
                c if format::is_structural(c) => {
                    return Err(DecodeError::MalformedEncoding(format!(
                        "stray structural token U+{:04X} in text",
                        c as u32
                    )));
                }
                c => match self.table.entry_for_token(c) {
                    Some(entry) if entry.kind == SymbolKind::Rarity => {
                        return Err(DecodeError::MalformedEncoding(format!(
                            "rarity '{}' in text",
                            entry.source
                        )));
                    }
                    Some(entry) => text.push_str(entry.source),
                    None if symbols::is_private_use(c) => return Err(unknown_token(c)),
                    None => text.push(c),
                },
            }
            rest = &rest[c.len_utf8()..];
        }
        Ok(Some(text))
    }
}

fn unknown_token(c: char) -> DecodeError {
    DecodeError::UnknownSymbol(format!("U+{:04X}", c as u32))
}

fn check_plain_field(field: FaceField, value: &str) -> Result<(), DecodeError> {
    match value.chars().find(|&c| symbols::is_private_use(c)) {
        Some(c) => Err(DecodeError::MalformedEncoding(format!(
            "token U+{:04X} in {field} field",
            c as u32
        ))),
        None => Ok(()),
    }
}

fn decode_type_list(field: FaceField, value: &str) -> Result<BTreeSet<String>, DecodeError> {
    if value.is_empty() {
        return Ok(BTreeSet::new());
    }
    let mut types = BTreeSet::new();
    for entry in value.split(LIST_SEP) {
        if entry.is_empty() {
            return Err(DecodeError::MalformedEncoding(format!(
                "empty entry in {field} field"
            )));
        }
        check_plain_field(field, entry)?;
        types.insert(entry.to_string());
    }
    Ok(types)
}

fn read_i32(field: FaceField, value: &str) -> Result<(i32, usize), DecodeError> {
    let (n, used) = format::read_number(value).map_err(|e| DecodeError::in_field(field, e))?;
    let n = i32::try_from(n)
        .map_err(|_| DecodeError::MalformedEncoding(format!("{field}: {n} out of range")))?;
    Ok((n, used))
}

fn decode_power_toughness(value: &str) -> Result<Option<(i32, i32)>, DecodeError> {
    if value.is_empty() {
        return Ok(None);
    }
    let field = FaceField::PowerToughness;
    let (power, used) = read_i32(field, value)?;
    let (toughness, used2) = read_i32(field, &value[used..])?;
    if used + used2 != value.len() {
        return Err(DecodeError::MalformedEncoding(format!(
            "{field}: trailing data"
        )));
    }
    Ok(Some((power, toughness)))
}

fn decode_single_number(field: FaceField, value: &str) -> Result<Option<i32>, DecodeError> {
    if value.is_empty() {
        return Ok(None);
    }
    let (n, used) = read_i32(field, value)?;
    if used != value.len() {
        return Err(DecodeError::MalformedEncoding(format!(
            "{field}: trailing data"
        )));
    }
    Ok(Some(n))
}
