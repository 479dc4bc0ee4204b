//! Codec tests: symbol table, encoder, decoder and reminder stripping

use std::collections::HashSet;

use mtg_corpus::codec::format::{FACE_SEP, FIELD_SEP};
use mtg_corpus::codec::{Decoder, Encoder, SymbolKind, SymbolTable, colors_used};
use mtg_corpus::models::{Card, Side};
use mtg_corpus::reminder::ReminderStripper;
use mtg_corpus::validation::compare_cards;

fn round_trip(card: &Card) -> (Card, Card) {
    let encoder = Encoder::standard();
    let expected = encoder.unreversible_modifications(card);
    let encoded = encoder.encode(card).unwrap();
    let decoded = Decoder::standard().decode(&encoded).unwrap();
    (expected, decoded)
}

mod symbol_table_tests {
    use super::*;

    #[test]
    fn test_every_entry_round_trips() {
        let table = SymbolTable::standard();
        for entry in table.entries() {
            let token = table.encode(entry.source).unwrap();
            assert_eq!(table.decode(token).unwrap(), entry.source);
        }
    }

    #[test]
    fn test_no_two_sources_share_a_token() {
        let table = SymbolTable::standard();
        let tokens: HashSet<char> = table.entries().iter().map(|e| e.encoded).collect();
        assert_eq!(tokens.len(), table.len());
        assert!(table.entries_of(SymbolKind::Rarity).count() >= 4);
    }

    #[test]
    fn test_unknown_symbol() {
        assert!(SymbolTable::standard().encode("{Purple}").is_err());
    }

    #[test]
    fn test_colors_used_in_wubrg_order() {
        assert_eq!(colors_used("{G}{2}{W/U}{B/P}"), vec!['W', 'U', 'B', 'G']);
        assert!(colors_used("{3}{C}").is_empty());
    }
}

mod encode_decode_tests {
    use super::*;

    #[test]
    fn test_vanilla_creature_round_trips_exactly() {
        let card = Card::new("Centaur Courser", "common")
            .with_cost("{2}{G}{G}")
            .with_maintypes(["Creature"])
            .with_subtypes(["Centaur", "Warrior"])
            .with_power_toughness(3, 4);
        let (expected, decoded) = round_trip(&card);
        assert_eq!(expected, card);
        assert_eq!(decoded, card);
    }

    #[test]
    fn test_rules_text_round_trips() {
        let card = Card::new("Llanowar Visionary", "common")
            .with_cost("{2}{G}")
            .with_maintypes(["Creature"])
            .with_subtypes(["Elf", "Druid"])
            .with_power_toughness(2, 2)
            .with_text(
                "Flying, trample\nWhen Llanowar Visionary enters, draw a card.\n{T}: Add {G}. Spend {2} less.",
            );
        let (expected, decoded) = round_trip(&card);
        assert!(compare_cards(&expected, &decoded).is_empty());

        let encoded = Encoder::standard().encode(&card).unwrap();
        assert!(!encoded.contains("Llanowar Visionary enters"));
        assert!(!encoded.contains('\n'));
    }

    #[test]
    fn test_large_numbers_and_joke_costs() {
        let card = Card::new("Big Thing", "rare")
            .with_cost("{25}{100}")
            .with_maintypes(["Creature"])
            .with_power_toughness(-1, 99)
            .with_text("Pay {30}: Big Thing gets +0/+0.");
        let (expected, decoded) = round_trip(&card);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_planeswalker_loyalty() {
        let card = Card::new("Jace Beleren", "mythic")
            .with_cost("{1}{U}{U}")
            .with_supertypes(["Legendary"])
            .with_maintypes(["Planeswalker"])
            .with_subtypes(["Jace"])
            .with_loyalty(3)
            .with_text("+2: Each player draws a card.");
        let (expected, decoded) = round_trip(&card);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_multi_faced_card_round_trips() {
        let mut card = Card::new("Delver of Secrets", "common")
            .with_cost("{U}")
            .with_maintypes(["Creature"])
            .with_power_toughness(1, 1)
            .with_text("At the beginning of your upkeep, look at the top card of your library.");
        card.attach_side(
            Side::B,
            Card::new("Insectile Aberration", "common")
                .with_maintypes(["Creature"])
                .with_power_toughness(3, 2)
                .with_text("Flying"),
        )
        .unwrap();

        let encoded = Encoder::standard().encode(&card).unwrap();
        assert_eq!(encoded.matches(FACE_SEP).count(), 1);
        assert_eq!(encoded.matches(FIELD_SEP).count(), 20);

        let (expected, decoded) = round_trip(&card);
        assert_eq!(decoded.num_sides, 2);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_decoder_rejects_garbage() {
        let decoder = Decoder::standard();
        assert!(decoder.decode("").is_err());
        assert!(decoder.decode("Grizzly Bears 2/2").is_err());
        assert!(decoder.decode(&format!("{FIELD_SEP}only{FIELD_SEP}")).is_err());
    }
}

mod reminder_tests {
    use super::*;

    #[test]
    fn test_flying_reminder_removed() {
        let stripper = ReminderStripper::standard();
        assert_eq!(
            stripper.strip(
                "Flying (This creature can't be blocked except by creatures with flying or reach.)"
            ),
            "Flying"
        );
    }

    #[test]
    fn test_unknown_parenthetical_kept() {
        let stripper = ReminderStripper::standard();
        let text = "Draw a card. (You may look at it.)";
        assert_eq!(stripper.strip(text), text);
    }

    #[test]
    fn test_stripping_is_idempotent() {
        let stripper = ReminderStripper::standard();
        for text in [
            "Flying (This creature can't be blocked except by creatures with flying or reach.)",
            "Trample (This creature can deal excess combat damage to the player or planeswalker it's attacking.)\nHaste",
            "Draw a card. (You may look at it.)",
            "",
        ] {
            let once = stripper.strip(text);
            assert_eq!(stripper.strip(&once), once);
        }
    }
}
