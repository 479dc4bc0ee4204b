//! Structural tokens and number encoding of the AI format
//!
//! A face is nine fields wrapped in field separators:
//!
//! ```text
//! FS name FS supertypes FS maintypes FS subtypes FS cost FS pt FS loyalty FS rarity FS text FS
//! ```
//!
//! Faces of one card are joined by [`FACE_SEP`], cards by [`CARD_SEP`].

/// Separates the fields of a face
pub const FIELD_SEP: char = '\u{E000}';
/// Separates the faces of a card
pub const FACE_SEP: char = '\u{E001}';
/// Line break inside rules text
pub const NEWLINE: char = '\u{E002}';
/// Starts a unary number
pub const UNARY_MARKER: char = '\u{E003}';
/// One unit of a unary number
pub const UNARY_COUNTER: char = '\u{E004}';
/// Opens a decimal number
pub const NUMERAL_OPEN: char = '\u{E005}';
/// Closes a decimal number
pub const NUMERAL_CLOSE: char = '\u{E006}';
/// Stands for the face's own name inside its rules text
pub const THIS_NAME: char = '\u{E007}';
/// Joins the entries of a type list
pub const LIST_SEP: char = '\u{E008}';

/// Separates encoded cards in a corpus
pub const CARD_SEP: char = '\n';

/// Largest number written in unary
pub const UNARY_MAX: i64 = 20;

/// Alphabet size above which a corpus is flagged as too wide for the model
pub const ALPHABET_LIMIT: usize = 255;

/// Number of fields per face
pub const FIELD_COUNT: usize = 9;

/// Whether `c` is one of the structural tokens
pub fn is_structural(c: char) -> bool {
    ('\u{E000}'..='\u{E008}').contains(&c)
}

/// Fields of an encoded face, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceField {
    Name,
    Supertypes,
    Maintypes,
    Subtypes,
    Cost,
    PowerToughness,
    Loyalty,
    Rarity,
    Text,
}

impl FaceField {
    pub const ORDER: [FaceField; FIELD_COUNT] = [
        FaceField::Name,
        FaceField::Supertypes,
        FaceField::Maintypes,
        FaceField::Subtypes,
        FaceField::Cost,
        FaceField::PowerToughness,
        FaceField::Loyalty,
        FaceField::Rarity,
        FaceField::Text,
    ];

    /// Field name as used on [`crate::models::Card`]
    pub fn name(&self) -> &'static str {
        match self {
            FaceField::Name => "name",
            FaceField::Supertypes => "supertypes",
            FaceField::Maintypes => "maintypes",
            FaceField::Subtypes => "subtypes",
            FaceField::Cost => "cost",
            FaceField::PowerToughness => "power_toughness",
            FaceField::Loyalty => "loyalty",
            FaceField::Rarity => "rarity",
            FaceField::Text => "text",
        }
    }
}

impl std::fmt::Display for FaceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from reading an encoded number
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberError {
    #[error("expected a number")]
    NotANumber,
    #[error("numeral is not terminated")]
    Unterminated,
    #[error("invalid numeral '{0}'")]
    InvalidNumeral(String),
}

/// Append the encoding of `n` to `out`
pub fn push_number(out: &mut String, n: i64) {
    if (0..=UNARY_MAX).contains(&n) {
        out.push(UNARY_MARKER);
        out.extend(std::iter::repeat_n(UNARY_COUNTER, n as usize));
    } else {
        out.push(NUMERAL_OPEN);
        out.push_str(&n.to_string());
        out.push(NUMERAL_CLOSE);
    }
}

pub fn encode_number(n: i64) -> String {
    let mut out = String::new();
    push_number(&mut out, n);
    out
}

/// Read one number from the start of `input`.
///
/// Returns the value and the number of bytes consumed.
pub fn read_number(input: &str) -> Result<(i64, usize), NumberError> {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, UNARY_MARKER)) => {
            let mut count = 0i64;
            let mut end = UNARY_MARKER.len_utf8();
            for (idx, c) in chars {
                if c != UNARY_COUNTER {
                    break;
                }
                count += 1;
                end = idx + c.len_utf8();
            }
            Ok((count, end))
        }
        Some((_, NUMERAL_OPEN)) => {
            let body_start = NUMERAL_OPEN.len_utf8();
            let close = input[body_start..]
                .find(NUMERAL_CLOSE)
                .ok_or(NumberError::Unterminated)?;
            let digits = &input[body_start..body_start + close];
            let value = digits
                .parse::<i64>()
                .map_err(|_| NumberError::InvalidNumeral(digits.to_string()))?;
            Ok((value, body_start + close + NUMERAL_CLOSE.len_utf8()))
        }
        _ => Err(NumberError::NotANumber),
    }
}

/// Whether `c` starts a number
pub fn starts_number(c: char) -> bool {
    c == UNARY_MARKER || c == NUMERAL_OPEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_numbers_are_unary() {
        assert_eq!(encode_number(0), UNARY_MARKER.to_string());
        assert_eq!(
            encode_number(3),
            format!("{UNARY_MARKER}{UNARY_COUNTER}{UNARY_COUNTER}{UNARY_COUNTER}")
        );
        assert_eq!(encode_number(UNARY_MAX).chars().count(), 21);
    }

    #[test]
    fn test_large_and_negative_numbers_use_numeral() {
        assert_eq!(
            encode_number(21),
            format!("{NUMERAL_OPEN}21{NUMERAL_CLOSE}")
        );
        assert_eq!(
            encode_number(-1),
            format!("{NUMERAL_OPEN}-1{NUMERAL_CLOSE}")
        );
    }

    #[test]
    fn test_read_number_reports_consumed_bytes() {
        let encoded = format!("{}{}rest", encode_number(2), encode_number(99));
        let (first, used) = read_number(&encoded).unwrap();
        assert_eq!(first, 2);
        let (second, used2) = read_number(&encoded[used..]).unwrap();
        assert_eq!(second, 99);
        assert_eq!(&encoded[used + used2..], "rest");
    }

    #[test]
    fn test_read_number_errors() {
        assert_eq!(read_number("7"), Err(NumberError::NotANumber));
        assert_eq!(
            read_number(&format!("{NUMERAL_OPEN}12")),
            Err(NumberError::Unterminated)
        );
        assert_eq!(
            read_number(&format!("{NUMERAL_OPEN}x{NUMERAL_CLOSE}")),
            Err(NumberError::InvalidNumeral("x".to_string()))
        );
    }

    #[test]
    fn test_field_order() {
        let names: Vec<_> = FaceField::ORDER.iter().map(|f| f.name()).collect();
        assert_eq!(names[0], "name");
        assert_eq!(names[8], "text");
        assert_eq!(names.len(), FIELD_COUNT);
    }
}
