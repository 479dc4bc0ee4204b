//! Output formatting for CLI

use crate::codec::colors_used;
use crate::models::Card;
use crate::pipeline::SampleReview;

fn type_line(card: &Card) -> String {
    let mut line: Vec<&str> = card.supertypes.iter().map(String::as_str).collect();
    line.extend(card.maintypes.iter().map(String::as_str));
    let mut out = line.join(" ");
    if !card.subtypes.is_empty() {
        let subtypes: Vec<&str> = card.subtypes.iter().map(String::as_str).collect();
        out.push_str(" - ");
        out.push_str(&subtypes.join(" "));
    }
    out
}

fn push_face(card: &Card, indent: &str, output: &mut String) {
    output.push_str(&format!("{indent}{}", card.name));
    if let Some(cost) = &card.cost {
        output.push_str(&format!(" {cost}"));
        let colors: String = colors_used(cost).into_iter().collect();
        if !colors.is_empty() {
            output.push_str(&format!(" [{colors}]"));
        }
    }
    output.push('\n');
    output.push_str(&format!("{indent}  {} ({})\n", type_line(card), card.rarity));
    if let Some((power, toughness)) = card.power_toughness {
        output.push_str(&format!("{indent}  {power}/{toughness}\n"));
    }
    if let Some(loyalty) = card.loyalty {
        output.push_str(&format!("{indent}  Loyalty: {loyalty}\n"));
    }
    if let Some(text) = &card.main_text {
        for line in text.lines() {
            output.push_str(&format!("{indent}  {line}\n"));
        }
    }
}

/// Human-readable rendering of a card and its sides
pub fn format_card(card: &Card) -> String {
    let mut output = String::new();
    push_face(card, "", &mut output);
    for (side, face) in card.sides() {
        output.push_str(&format!("  // side {side}\n"));
        push_face(face, "  ", &mut output);
    }
    output
}

/// Summary of a generated-sample review
pub fn format_review(review: &SampleReview) -> String {
    let mut output = String::new();

    if !review.failures.is_empty() {
        output.push_str("\nRejected samples:\n");
        for failure in &review.failures {
            output.push_str(&format!("  - #{}: {}\n", failure.index, failure.reason));
        }
    }

    output.push_str(&format!(
        "\n{} samples: {} valid, {} invalid, {} unparsed ({:.1}% valid)\n",
        review.total(),
        review.valid,
        review.invalid,
        review.unparsed,
        review.valid_ratio() * 100.0
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_card() {
        let card = Card::new("Grizzly Bears", "common")
            .with_cost("{1}{G}")
            .with_maintypes(["Creature"])
            .with_subtypes(["Bear"])
            .with_power_toughness(2, 2);
        let text = format_card(&card);
        assert!(text.starts_with("Grizzly Bears {1}{G} [G]\n"));
        assert!(text.contains("Creature - Bear (common)"));
        assert!(text.contains("2/2"));
    }
}
