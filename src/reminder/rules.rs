//! Allow-listed reminder-text rules
//!
//! Each rule pairs the keyword that must appear before a parenthetical with a
//! pattern for the parenthetical's body. Both are matched case-insensitively.

use once_cell::sync::Lazy;
use regex::Regex;

/// One keyword / reminder-text pair
#[derive(Debug, Clone)]
pub struct ReminderRule {
    pub name: &'static str,
    pub keyword: Regex,
    pub reminder: Regex,
}

impl ReminderRule {
    /// Compile a rule. Patterns are matched case-insensitively.
    pub fn new(name: &'static str, keyword: &str, reminder: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            keyword: Regex::new(&format!("(?i){keyword}"))?,
            reminder: Regex::new(&format!("(?i){reminder}"))?,
        })
    }

    /// Whether this rule explains `body` given the text preceding it
    pub fn fires(&self, preface: &str, body: &str) -> bool {
        self.reminder.is_match(body) && self.keyword.is_match(preface)
    }
}

const RULE_SOURCES: &[(&str, &str, &str)] = &[
    (
        "flying",
        r"\bflying\b",
        r"can.t be blocked except by creatures with flying or reach",
    ),
    ("reach", r"\breach\b", r"can block creatures with flying"),
    ("trample", r"\btrample\b", r"excess (?:combat )?damage"),
    (
        "haste",
        r"\bhaste\b",
        r"can attack and \{T\} (?:as soon as|this turn)",
    ),
    (
        "vigilance",
        r"\bvigilance\b",
        r"attacking doesn.t cause (?:this creature|it) to tap",
    ),
    (
        "deathtouch",
        r"\bdeathtouch\b",
        r"any amount of damage (?:this|it) deals to a creature is enough to destroy it",
    ),
    (
        "lifelink",
        r"\blifelink\b",
        r"damage dealt by (?:this creature|it) also causes (?:you|its controller) to gain that much life",
    ),
    (
        "first strike",
        r"\bfirst strike\b",
        r"deals combat damage before creatures without first strike",
    ),
    (
        "double strike",
        r"\bdouble strike\b",
        r"deals both first-strike and regular combat damage",
    ),
    ("defender", r"\bdefender\b", r"can.t attack"),
    (
        "flash",
        r"\bflash\b",
        r"you may cast (?:this|it) (?:spell )?any time you could cast an instant",
    ),
    (
        "hexproof",
        r"\bhexproof\b",
        r"can.t be the target of spells or abilities your opponents control",
    ),
    (
        "indestructible",
        r"\bindestructible\b",
        r"damage and effects that say .destroy. don.t destroy",
    ),
    (
        "menace",
        r"\bmenace\b",
        r"can.t be blocked except by two or more creatures",
    ),
    (
        "shroud",
        r"\bshroud\b",
        r"can.t be the target of spells or abilities",
    ),
    (
        "equip",
        r"\bequip\b",
        r"attach to target creature you control\. equip only as a sorcery",
    ),
    ("kicker", r"\bkicker\b", r"you may pay an additional"),
    ("cycling", r"cycling\b", r"discard this card: "),
    (
        "flashback",
        r"\bflashback\b",
        r"you may cast this card from your graveyard for its flashback cost",
    ),
    (
        "scry",
        r"\bscry\b",
        r"look at the top .*put any number of them on the bottom",
    ),
    (
        "landwalk",
        r"\b\w+walk\b",
        r"can.t be blocked as long as defending player controls an? ",
    ),
    (
        "protection",
        r"\bprotection from\b",
        r"can.t be blocked, targeted, dealt damage,? (?:or )?enchanted",
    ),
    (
        "prowess",
        r"\bprowess\b",
        r"whenever you cast a noncreature spell, this creature gets \+1/\+1",
    ),
    (
        "ward",
        r"\bward\b",
        r"becomes the target of a spell or ability an opponent controls, counter it unless",
    ),
    ("convoke", r"\bconvoke\b", r"your creatures can help cast this spell"),
    (
        "cascade",
        r"\bcascade\b",
        r"exile cards from the top of your library until you exile a nonland card",
    ),
    (
        "morph",
        r"\bmorph\b",
        r"you may cast this card face down as a 2/2 creature",
    ),
    ("changeling", r"\bchangeling\b", r"this card is every creature type"),
    (
        "storm",
        r"\bstorm\b",
        r"copy (?:it|this spell) for each spell cast before it this turn",
    ),
    (
        "fear",
        r"\bfear\b",
        r"can.t be blocked except by artifact creatures and/or black creatures",
    ),
];

pub(crate) static STANDARD_RULES: Lazy<Vec<ReminderRule>> = Lazy::new(|| {
    RULE_SOURCES
        .iter()
        .map(|&(name, keyword, reminder)| {
            ReminderRule::new(name, keyword, reminder).expect("reminder rule patterns compile")
        })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(STANDARD_RULES.len(), RULE_SOURCES.len());
    }

    #[test]
    fn test_rule_needs_keyword_in_preface() {
        let flying = STANDARD_RULES.iter().find(|r| r.name == "flying").unwrap();
        let body = "This creature can't be blocked except by creatures with flying or reach.";
        assert!(flying.fires("Flying ", body));
        assert!(!flying.fires("Trample ", body));
    }

    #[test]
    fn test_landwalk_matches_any_land_type() {
        let rule = STANDARD_RULES.iter().find(|r| r.name == "landwalk").unwrap();
        assert!(rule.fires(
            "Swampwalk ",
            "This creature can't be blocked as long as defending player controls a Swamp."
        ));
    }
}
