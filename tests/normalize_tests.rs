//! Normalizer and validator tests over inline MTGJSON fixtures

use mtg_corpus::import::{MtgJsonImporter, NormalizeOptions, NormalizeResult, SchemaError};
use mtg_corpus::models::{FaceIndex, Side};
use mtg_corpus::validation::{CardValidator, ValidationError, check_face_forest};
use serde_json::{Value, json};

fn normalize(data: Value) -> NormalizeResult {
    let importer = MtgJsonImporter::new(
        NormalizeOptions::default()
            .with_retain_json_fields(true)
            .with_excluded_set_types(["funny"]),
    );
    let db = importer
        .parse_value(json!({"meta": {"version": "5.2.2"}, "data": data}))
        .unwrap();
    importer.normalize(&db)
}

mod normalizer_tests {
    use super::*;

    #[test]
    fn test_vanilla_creature() {
        let result = normalize(json!({"M10": {"type": "core", "cards": [{
            "name": "Centaur Courser",
            "manaCost": "{2}{G}{G}",
            "power": "3",
            "toughness": "4",
            "rarity": "common",
            "types": ["Creature"],
            "subtypes": ["Centaur", "Warrior"],
            "uuid": "c-1",
            "layout": "normal"
        }]}}));

        assert!(result.errors.is_empty());
        let card = &result.cards[0];
        assert_eq!(card.cost.as_deref(), Some("{2}{G}{G}"));
        assert_eq!(card.power_toughness, Some((3, 4)));
        assert_eq!(card.num_sides, 1);
        assert_eq!(card.linked_side_count(), 0);
        assert_eq!(card.source_set_code(), Some("M10"));
    }

    #[test]
    fn test_two_faced_card_attaches_under_b_side() {
        let result = normalize(json!({"ISD": {"type": "expansion", "cards": [
            {
                "name": "Delver of Secrets // Insectile Aberration",
                "faceName": "Delver of Secrets",
                "side": "a",
                "manaCost": "{U}",
                "types": ["Creature"], "power": "1", "toughness": "1",
                "text": "At the beginning of your upkeep, look at the top card of your library.",
                "rarity": "common",
                "uuid": "front",
                "otherFaceIds": ["back"],
                "layout": "transform"
            },
            {
                "name": "Delver of Secrets // Insectile Aberration",
                "faceName": "Insectile Aberration",
                "side": "b",
                "types": ["Creature"], "power": "3", "toughness": "2",
                "text": "Flying",
                "rarity": "common",
                "uuid": "back",
                "otherFaceIds": ["front"],
                "layout": "transform"
            }
        ]}}));

        assert!(result.errors.is_empty());
        assert_eq!(result.cards.len(), 1);
        let front = &result.cards[0];
        assert_eq!(front.name, "Delver of Secrets");
        assert_eq!(front.num_sides, 2);
        assert_eq!(
            front.side(Side::B).map(|b| b.name.as_str()),
            Some("Insectile Aberration")
        );

        let index = FaceIndex::build(&result.cards);
        assert!(index.a_side("front").is_none());
        assert_eq!(
            index.a_side("back").map(|a| a.name.as_str()),
            Some("Delver of Secrets")
        );
    }

    #[test]
    fn test_face_order_in_source_does_not_matter() {
        let result = normalize(json!({"ISD": {"type": "expansion", "cards": [
            {"name": "Back", "side": "b", "rarity": "rare", "types": ["Sorcery"],
             "text": "Draw a card.", "uuid": "b", "otherFaceIds": ["a"]},
            {"name": "Front", "side": "a", "rarity": "rare", "types": ["Sorcery"],
             "text": "Draw a card.", "uuid": "a", "otherFaceIds": ["b"]}
        ]}}));
        assert_eq!(result.cards.len(), 1);
        assert_eq!(result.cards[0].num_sides, 2);
    }

    #[test]
    fn test_dangling_face_dropped() {
        let result = normalize(json!({"ISD": {"type": "expansion", "cards": [
            {"name": "Orphan", "side": "b", "rarity": "rare", "uuid": "o",
             "otherFaceIds": ["missing"]}
        ]}}));
        assert!(result.cards.is_empty());
        assert!(matches!(
            result.errors[0].error,
            SchemaError::DanglingFaceReference { .. }
        ));
    }

    #[test]
    fn test_missing_power_is_inconsistent() {
        let result = normalize(json!({"M10": {"type": "core", "cards": [{
            "name": "Half Bear", "rarity": "common", "types": ["Creature"], "toughness": "2"
        }]}}));
        assert_eq!(
            result.errors[0].error,
            SchemaError::InconsistentPowerToughness {
                name: "Half Bear".to_string()
            }
        );
    }

    #[test]
    fn test_undocumented_keys_tolerated() {
        let result = normalize(json!({"M10": {"type": "core", "cards": [{
            "name": "Opt", "rarity": "common", "types": ["Instant"], "text": "Scry 1.",
            "someFutureKey": {"nested": [1, 2, 3]}, "edhrecRank": 12
        }]}}));
        assert!(result.errors.is_empty());
        assert_eq!(result.cards.len(), 1);
    }

    #[test]
    fn test_forest_invariant_holds_across_sets() {
        let result = normalize(json!({
            "AAA": {"type": "expansion", "cards": [
                {"name": "A1", "side": "a", "rarity": "rare", "uuid": "a1", "otherFaceIds": ["a2", "a3"]},
                {"name": "A2", "side": "b", "rarity": "rare", "uuid": "a2", "otherFaceIds": ["a1", "a3"]},
                {"name": "A3", "side": "c", "rarity": "rare", "uuid": "a3", "otherFaceIds": ["a1", "a2"]}
            ]},
            "BBB": {"type": "expansion", "cards": [
                {"name": "B1", "rarity": "common", "uuid": "b1"},
                {"name": "B2", "side": "a", "rarity": "common", "uuid": "b2", "otherFaceIds": ["b3"]},
                {"name": "B3", "side": "b", "rarity": "common", "uuid": "b3", "otherFaceIds": ["b2"]}
            ]}
        }));

        assert!(result.errors.is_empty());
        let report = check_face_forest(&result.cards).unwrap();
        assert_eq!(report.primaries, 3);
        assert_eq!(report.faces, 3);
        assert_eq!(result.face_count(), 6);
    }
}

mod validator_tests {
    use super::*;

    #[test]
    fn test_creature_missing_power_fails_validation() {
        let mut result = normalize(json!({"M10": {"type": "core", "cards": [{
            "name": "Grizzly Bears", "rarity": "common", "types": ["Creature"],
            "power": "2", "toughness": "2"
        }]}}));
        let card = &mut result.cards[0];
        card.power_toughness = None;
        assert_eq!(
            CardValidator::standard().validate(card),
            Err(ValidationError::InconsistentPowerToughness {
                name: "Grizzly Bears".to_string()
            })
        );
    }

    #[test]
    fn test_funny_set_is_excluded_after_validation() {
        let result = normalize(json!({"UNH": {"type": "funny", "cards": [{
            "name": "Gleemax", "rarity": "rare", "types": ["Artifact"], "supertypes": ["Legendary"],
            "text": "You choose all targets."
        }]}}));
        let validator = CardValidator::standard().with_policy(
            mtg_corpus::validation::StandardExclusionPolicy::new()
                .with_excluded_set_codes(result.excluded_set_codes.iter().cloned()),
        );
        let err = validator.validate(&result.cards[0]).unwrap_err();
        assert!(err.is_exclusion());
    }
}
