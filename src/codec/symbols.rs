//! Symbol table for the AI format
//!
//! Maps multi-character source tokens (mana symbols, rarity strings, a handful
//! of keywords) to single private-use characters and back. The table is static:
//! it is built once from the constant entry lists below and never mutated.
//!
//! Generic mana (`{N}`) is not in the table. Those groups are recognised by
//! pattern and handed to the number encoding in [`super::format`], except for
//! the two joke-card outliers `{100}` and `{1000000}`, which have entries of
//! their own.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// First code point of the Unicode private-use area
pub const PRIVATE_USE_START: char = '\u{E000}';
/// Last code point of the BMP private-use area
pub const PRIVATE_USE_END: char = '\u{F8FF}';

/// Whether `c` lies in the private-use area reserved for encoded tokens
pub fn is_private_use(c: char) -> bool {
    (PRIVATE_USE_START..=PRIVATE_USE_END).contains(&c)
}

/// Category of a symbol-table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Rarity,
    Mana,
    Keyword,
}

/// One bidirectional table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    pub source: &'static str,
    pub encoded: char,
    pub kind: SymbolKind,
}

/// Errors raised by symbol lookups and table construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("Encoded token U+{:04X} is shared by '{first}' and '{second}'", *.token as u32)]
    Collision {
        token: char,
        first: &'static str,
        second: &'static str,
    },
    #[error("Source token '{0}' appears more than once")]
    DuplicateSource(&'static str),
    #[error("Encoded token for '{0}' is outside the private-use area")]
    NotPrivateUse(&'static str),
    #[error("Malformed mana cost '{0}'")]
    MalformedCost(String),
}

const RARITIES: &[(&str, char)] = &[
    ("common", '\u{E010}'),
    ("uncommon", '\u{E011}'),
    ("rare", '\u{E012}'),
    ("mythic", '\u{E013}'),
    ("special", '\u{E014}'),
    ("bonus", '\u{E015}'),
];

const MANA: &[(&str, char)] = &[
    ("{W}", '\u{E020}'),
    ("{U}", '\u{E021}'),
    ("{B}", '\u{E022}'),
    ("{R}", '\u{E023}'),
    ("{G}", '\u{E024}'),
    ("{C}", '\u{E025}'),
    ("{S}", '\u{E026}'),
    ("{X}", '\u{E027}'),
    ("{Y}", '\u{E028}'),
    ("{Z}", '\u{E029}'),
    ("{T}", '\u{E02A}'),
    ("{Q}", '\u{E02B}'),
    ("{E}", '\u{E02C}'),
    ("{P}", '\u{E02D}'),
    ("{A}", '\u{E02E}'),
    ("{TK}", '\u{E02F}'),
    // hybrid
    ("{W/U}", '\u{E030}'),
    ("{W/B}", '\u{E031}'),
    ("{U/B}", '\u{E032}'),
    ("{U/R}", '\u{E033}'),
    ("{B/R}", '\u{E034}'),
    ("{B/G}", '\u{E035}'),
    ("{R/G}", '\u{E036}'),
    ("{R/W}", '\u{E037}'),
    ("{G/W}", '\u{E038}'),
    ("{G/U}", '\u{E039}'),
    ("{2/W}", '\u{E03A}'),
    ("{2/U}", '\u{E03B}'),
    ("{2/B}", '\u{E03C}'),
    ("{2/R}", '\u{E03D}'),
    ("{2/G}", '\u{E03E}'),
    // phyrexian
    ("{W/P}", '\u{E040}'),
    ("{U/P}", '\u{E041}'),
    ("{B/P}", '\u{E042}'),
    ("{R/P}", '\u{E043}'),
    ("{G/P}", '\u{E044}'),
    ("{C/P}", '\u{E045}'),
    ("{W/U/P}", '\u{E046}'),
    ("{W/B/P}", '\u{E047}'),
    ("{U/B/P}", '\u{E048}'),
    ("{U/R/P}", '\u{E049}'),
    ("{B/R/P}", '\u{E04A}'),
    ("{B/G/P}", '\u{E04B}'),
    ("{R/G/P}", '\u{E04C}'),
    ("{R/W/P}", '\u{E04D}'),
    ("{G/W/P}", '\u{E04E}'),
    ("{G/U/P}", '\u{E04F}'),
    ("{C/W}", '\u{E050}'),
    ("{C/U}", '\u{E051}'),
    ("{C/B}", '\u{E052}'),
    ("{C/R}", '\u{E053}'),
    ("{C/G}", '\u{E054}'),
    // un-set oddities
    ("{HW}", '\u{E055}'),
    ("{HR}", '\u{E056}'),
    ("{½}", '\u{E057}'),
    ("{∞}", '\u{E058}'),
    ("{100}", '\u{E059}'),
    ("{1000000}", '\u{E05A}'),
    ("{L}", '\u{E05B}'),
    ("{D}", '\u{E05C}'),
    ("{PW}", '\u{E05D}'),
    ("{CHAOS}", '\u{E05E}'),
    ("{H}", '\u{E05F}'),
];

const KEYWORDS: &[(&str, char)] = &[
    ("Flying", '\u{E0C0}'),
    ("First strike", '\u{E0C1}'),
    ("Double strike", '\u{E0C2}'),
    ("Deathtouch", '\u{E0C3}'),
    ("Defender", '\u{E0C4}'),
    ("Flash", '\u{E0C5}'),
    ("Haste", '\u{E0C6}'),
    ("Hexproof", '\u{E0C7}'),
    ("Indestructible", '\u{E0C8}'),
    ("Lifelink", '\u{E0C9}'),
    ("Menace", '\u{E0CA}'),
    ("Reach", '\u{E0CB}'),
    ("Trample", '\u{E0CC}'),
    ("Vigilance", '\u{E0CD}'),
    ("Ward", '\u{E0CE}'),
    ("Equip", '\u{E0CF}'),
    ("Enchant", '\u{E0D0}'),
    ("Flashback", '\u{E0D1}'),
    ("Kicker", '\u{E0D2}'),
    ("Cycling", '\u{E0D3}'),
    ("Scry", '\u{E0D4}'),
    ("Prowess", '\u{E0D5}'),
];

static STANDARD: Lazy<SymbolTable> = Lazy::new(|| {
    SymbolTable::from_entries(standard_entries()).expect("standard symbol table is a bijection")
});

static MANA_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:0|[1-9][0-9]*)$").unwrap());

/// Entries of the standard table, rarities first
pub fn standard_entries() -> Vec<SymbolEntry> {
    let tagged = |list: &'static [(&'static str, char)], kind| {
        list.iter().map(move |&(source, encoded)| SymbolEntry {
            source,
            encoded,
            kind,
        })
    };
    tagged(RARITIES, SymbolKind::Rarity)
        .chain(tagged(MANA, SymbolKind::Mana))
        .chain(tagged(KEYWORDS, SymbolKind::Keyword))
        .collect()
}

/// Static bidirectional map between source tokens and encoded tokens
#[derive(Debug, Clone)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    forward: HashMap<&'static str, usize>,
    backward: HashMap<char, usize>,
}

impl SymbolTable {
    /// Build a table, rejecting duplicate sources, shared encoded tokens and
    /// tokens outside the private-use area
    pub fn from_entries(entries: Vec<SymbolEntry>) -> Result<Self, SymbolError> {
        let mut forward = HashMap::with_capacity(entries.len());
        let mut backward = HashMap::with_capacity(entries.len());

        for (idx, entry) in entries.iter().enumerate() {
            if !is_private_use(entry.encoded) {
                return Err(SymbolError::NotPrivateUse(entry.source));
            }
            if forward.insert(entry.source, idx).is_some() {
                return Err(SymbolError::DuplicateSource(entry.source));
            }
            if let Some(previous) = backward.insert(entry.encoded, idx) {
                return Err(SymbolError::Collision {
                    token: entry.encoded,
                    first: entries[previous].source,
                    second: entry.source,
                });
            }
        }

        Ok(Self {
            entries,
            forward,
            backward,
        })
    }

    /// The process-wide standard table
    pub fn standard() -> &'static SymbolTable {
        &STANDARD
    }

    pub fn encode(&self, source: &str) -> Result<char, SymbolError> {
        self.forward
            .get(source)
            .map(|&idx| self.entries[idx].encoded)
            .ok_or_else(|| SymbolError::UnknownSymbol(source.to_string()))
    }

    pub fn decode(&self, token: char) -> Result<&'static str, SymbolError> {
        self.backward
            .get(&token)
            .map(|&idx| self.entries[idx].source)
            .ok_or_else(|| SymbolError::UnknownSymbol(format!("U+{:04X}", token as u32)))
    }

    /// Look up an encoded token
    pub fn entry_for_token(&self, token: char) -> Option<&SymbolEntry> {
        self.backward.get(&token).map(|&idx| &self.entries[idx])
    }

    /// Look up a source token
    pub fn entry_for_source(&self, source: &str) -> Option<&SymbolEntry> {
        self.forward.get(source).map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn entries_of(&self, kind: SymbolKind) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Whether `rarity` is one of the known rarity strings
    pub fn is_known_rarity(&self, rarity: &str) -> bool {
        self.entry_for_source(rarity)
            .is_some_and(|e| e.kind == SymbolKind::Rarity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classify one `{...}` group
    pub fn classify_group(&self, group: &str) -> Result<ManaToken, SymbolError> {
        if let Some(entry) = self.entry_for_source(group) {
            if entry.kind == SymbolKind::Mana {
                return Ok(ManaToken::Symbol(entry.encoded));
            }
        }
        let inner = group
            .strip_prefix('{')
            .and_then(|g| g.strip_suffix('}'))
            .ok_or_else(|| SymbolError::MalformedCost(group.to_string()))?;
        if NUMERIC.is_match(inner) {
            return inner
                .parse::<i64>()
                .map(ManaToken::Generic)
                .map_err(|_| SymbolError::UnknownSymbol(group.to_string()));
        }
        Err(SymbolError::UnknownSymbol(group.to_string()))
    }

    /// Split a mana cost such as `{2}{G}{G}` into tokens.
    ///
    /// The whole string must consist of `{...}` groups; anything between or
    /// around them is a [`SymbolError::MalformedCost`].
    pub fn tokenize_cost(&self, cost: &str) -> Result<Vec<ManaToken>, SymbolError> {
        let mut tokens = Vec::new();
        let mut cursor = 0;
        for m in MANA_GROUP.find_iter(cost) {
            if m.start() != cursor {
                return Err(SymbolError::MalformedCost(cost.to_string()));
            }
            tokens.push(self.classify_group(m.as_str())?);
            cursor = m.end();
        }
        if cursor != cost.len() || tokens.is_empty() {
            return Err(SymbolError::MalformedCost(cost.to_string()));
        }
        Ok(tokens)
    }
}

/// One recognised `{...}` group of a mana cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManaToken {
    /// Table entry, already in encoded form
    Symbol(char),
    /// Generic mana amount, handled by the number encoding
    Generic(i64),
}

/// Iterate the `{...}` groups of arbitrary text with their byte ranges
pub fn mana_groups(text: &str) -> impl Iterator<Item = regex::Match<'_>> {
    MANA_GROUP.find_iter(text)
}

/// The WUBRG colors whose symbols appear in `cost`, in WUBRG order
pub fn colors_used(cost: &str) -> Vec<char> {
    const ORDER: [char; 5] = ['W', 'U', 'B', 'R', 'G'];
    let mut seen = [false; 5];
    for m in MANA_GROUP.captures_iter(cost) {
        for part in m[1].split('/') {
            let letter = match part {
                "HW" => 'W',
                "HR" => 'R',
                p if p.len() == 1 => p.chars().next().unwrap_or(' '),
                _ => continue,
            };
            if let Some(idx) = ORDER.iter().position(|&c| c == letter) {
                seen[idx] = true;
            }
        }
    }
    ORDER
        .iter()
        .zip(seen)
        .filter_map(|(&c, s)| s.then_some(c))
        .collect()
}
