use crate::normalize::normalize_term;
use anyhow::{Context, Result};
use cantocards_model::Term;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Read a word list: one term per line, blank lines ignored.
///
/// Order is preserved and duplicates pass through unchanged.
pub fn load_word_list(path: &Path) -> Result<Vec<Term>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read word list {}", path.display()))?;
    let terms = parse_word_list(&text);
    tracing::debug!(path = %path.display(), terms = terms.len(), "Loaded word list");
    Ok(terms)
}

fn parse_word_list(text: &str) -> Vec<Term> {
    text.lines()
        .map(normalize_term)
        .filter(|term| !term.is_empty())
        .collect()
}

/// HSK vocabulary level selecting which word list(s) a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HskLevel {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    All,
}

impl HskLevel {
    const LEVELS: [HskLevel; 6] = [
        HskLevel::One,
        HskLevel::Two,
        HskLevel::Three,
        HskLevel::Four,
        HskLevel::Five,
        HskLevel::Six,
    ];

    fn number(self) -> Option<u8> {
        match self {
            HskLevel::One => Some(1),
            HskLevel::Two => Some(2),
            HskLevel::Three => Some(3),
            HskLevel::Four => Some(4),
            HskLevel::Five => Some(5),
            HskLevel::Six => Some(6),
            HskLevel::All => None,
        }
    }

    /// Word-list file names for this level, lowest level first.
    pub fn files(self) -> Vec<String> {
        match self.number() {
            Some(n) => vec![format!("HSK{n}.txt")],
            None => Self::LEVELS
                .iter()
                .filter_map(|level| level.number())
                .map(|n| format!("HSK{n}.txt"))
                .collect(),
        }
    }
}

impl fmt::Display for HskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number() {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("all"),
        }
    }
}

impl FromStr for HskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" => Ok(HskLevel::One),
            "2" => Ok(HskLevel::Two),
            "3" => Ok(HskLevel::Three),
            "4" => Ok(HskLevel::Four),
            "5" => Ok(HskLevel::Five),
            "6" => Ok(HskLevel::Six),
            "0" | "all" => Ok(HskLevel::All),
            other => Err(format!("HSK level must be 1-6 or 'all', got '{other}'")),
        }
    }
}

/// Load the word list(s) for `level` from `dir`, concatenated in level order.
pub fn load_level(dir: &Path, level: HskLevel) -> Result<Vec<Term>> {
    let mut terms = Vec::new();
    for file in level.files() {
        terms.extend(load_word_list(&dir.join(file))?);
    }
    tracing::info!(level = %level, terms = terms.len(), "Loaded vocabulary");
    Ok(terms)
}
