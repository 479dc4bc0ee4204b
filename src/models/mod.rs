//! Card data model
//!
//! Normalized card records plus the computed face index used to navigate from
//! a non-primary face back to its primary.

pub mod card;
pub mod faces;

pub use card::{AttachError, COMPARED_FIELDS, Card, Side, field_repr};
pub use faces::{FaceIndex, FaceRef};
