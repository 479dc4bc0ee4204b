//! Computed back-references from non-primary faces to their primary
//!
//! Records only store owning links (primary -> side). The reverse direction is
//! rebuilt on load from the explicit `uuid` fields, so nothing in the dataset
//! ever holds a pointer back to its owner.

use std::collections::HashMap;

use super::card::{Card, Side};

/// Location of a face inside a dataset: the primary's index plus the side letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRef {
    pub primary: usize,
    pub side: Side,
}

/// Index from face id to the primary that owns it
#[derive(Debug)]
pub struct FaceIndex<'a> {
    cards: &'a [Card],
    by_id: HashMap<&'a str, FaceRef>,
}

impl<'a> FaceIndex<'a> {
    /// Build the index over a slice of primary records
    pub fn build(cards: &'a [Card]) -> Self {
        let mut by_id = HashMap::new();
        for (primary, card) in cards.iter().enumerate() {
            if let Some(id) = card.uuid.as_deref() {
                by_id.insert(id, FaceRef { primary, side: Side::A });
            }
            for (side, face) in card.sides() {
                if let Some(id) = face.uuid.as_deref() {
                    by_id.insert(id, FaceRef { primary, side });
                }
            }
        }
        Self { cards, by_id }
    }

    /// Locate a face by its source id
    pub fn locate(&self, id: &str) -> Option<FaceRef> {
        self.by_id.get(id).copied()
    }

    /// Resolve a face reference to the record it names
    pub fn face(&self, face: FaceRef) -> Option<&'a Card> {
        let primary = self.cards.get(face.primary)?;
        match face.side {
            Side::A => Some(primary),
            side => primary.side(side),
        }
    }

    /// The primary that owns the face with the given id.
    ///
    /// Returns `None` for primaries themselves and for unknown ids.
    pub fn a_side(&self, id: &str) -> Option<&'a Card> {
        let face = self.locate(id)?;
        if face.side.is_primary() {
            return None;
        }
        self.cards.get(face.primary)
    }

    /// Number of indexed faces
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Vec<Card> {
        let mut front = Card::new("Delver of Secrets", "common").with_uuid("front-1");
        front
            .attach_side(
                Side::B,
                Card::new("Insectile Aberration", "common").with_uuid("back-1"),
            )
            .unwrap();
        vec![
            Card::new("Lightning Bolt", "common").with_uuid("bolt"),
            front,
        ]
    }

    #[test]
    fn test_a_side_points_to_owner() {
        let cards = dataset();
        let index = FaceIndex::build(&cards);

        let owner = index.a_side("back-1").unwrap();
        assert_eq!(owner.name, "Delver of Secrets");
        assert!(index.a_side("front-1").is_none());
        assert!(index.a_side("missing").is_none());
    }

    #[test]
    fn test_locate_and_resolve() {
        let cards = dataset();
        let index = FaceIndex::build(&cards);

        let face = index.locate("back-1").unwrap();
        assert_eq!(face, FaceRef { primary: 1, side: Side::B });
        assert_eq!(index.face(face).unwrap().name, "Insectile Aberration");
        assert_eq!(index.len(), 3);
    }
}
