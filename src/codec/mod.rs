//! AI-format codec
//!
//! Provides the two directions of the corpus encoding:
//! - Symbol table for mana, rarity and keyword tokens
//! - Structural tokens, field order and number encoding
//! - Encoder from card records to single-line strings
//! - Decoder back to card records, with an optional error-correction pass

pub mod decoder;
pub mod encoder;
pub mod format;
pub mod symbols;

pub use decoder::{DecodeError, Decoder, error_correct};
pub use encoder::{EncodeError, Encoder};
pub use format::FaceField;
pub use symbols::{ManaToken, SymbolEntry, SymbolError, SymbolKind, SymbolTable, colors_used};
