//! Corpus writer

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::ExportError;
use crate::codec::format::{ALPHABET_LIMIT, CARD_SEP};

/// Facts about a written corpus file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusSummary {
    pub path: PathBuf,
    pub cards: usize,
    pub bytes: usize,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
    /// Distinct characters in the file, card separator included
    pub alphabet_size: usize,
}

/// Join encoded cards with the card separator, one trailing separator
pub fn render_corpus(encoded: &[String]) -> String {
    let mut out = String::with_capacity(encoded.iter().map(|e| e.len() + 1).sum());
    for card in encoded {
        out.push_str(card);
        out.push(CARD_SEP);
    }
    out
}

/// Distinct characters used by `text`
pub fn corpus_alphabet(text: &str) -> BTreeSet<char> {
    text.chars().collect()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Write the corpus file, creating parent directories as needed
pub fn write_corpus(path: &Path, encoded: &[String]) -> Result<CorpusSummary, ExportError> {
    let text = render_corpus(encoded);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
    }
    std::fs::write(path, &text).map_err(|e| ExportError::io(path, e))?;

    let alphabet_size = corpus_alphabet(&text).len();
    if alphabet_size > ALPHABET_LIMIT {
        warn!(
            alphabet_size,
            limit = ALPHABET_LIMIT,
            "Corpus alphabet exceeds the model vocabulary limit"
        );
    }

    let summary = CorpusSummary {
        path: path.to_path_buf(),
        cards: encoded.len(),
        bytes: text.len(),
        sha256: sha256_hex(text.as_bytes()),
        alphabet_size,
    };
    info!(
        path = %summary.path.display(),
        cards = summary.cards,
        bytes = summary.bytes,
        "Corpus written"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_has_trailing_separator() {
        let encoded = vec!["a".to_string(), "b".to_string()];
        assert_eq!(render_corpus(&encoded), "a\nb\n");
        assert_eq!(render_corpus(&[]), "");
    }

    #[test]
    fn test_write_corpus_summary() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("corpus.txt");
        let summary = write_corpus(&path, &["ab".to_string(), "ba".to_string()]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ab\nba\n");
        assert_eq!(summary.cards, 2);
        assert_eq!(summary.bytes, 6);
        assert_eq!(summary.alphabet_size, 3);
        assert_eq!(summary.sha256, sha256_hex(b"ab\nba\n"));
        assert_eq!(summary.sha256.len(), 64);
    }
}
