use serde::{Deserialize, Serialize};

/// Placeholder stored in any field the extractor could not resolve.
///
/// This is the single signal the bucketizer uses to tell complete
/// entries from incomplete ones.
pub const MISSING_DATA: &str = "MISSING_DATA";

/// A vocabulary word to look up, as read from the word list.
pub type Term = String;

/// A parsed dictionary record for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The term that was searched for (e.g., "你好").
    pub source_term: Term,
    /// Native-script rendering returned by the dictionary.
    pub character: String,
    /// English gloss.
    pub english: String,
    /// Bracketed pronunciation. `None` when the run does not track it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    /// Reference into the site's audio archive, usually relative.
    pub audio_url: String,
}

impl Entry {
    /// True iff no extracted field holds the sentinel.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of the fields that hold the sentinel, in column order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.character == MISSING_DATA {
            missing.push("character");
        }
        if self.english == MISSING_DATA {
            missing.push("english");
        }
        if self.pronunciation.as_deref() == Some(MISSING_DATA) {
            missing.push("pronunciation");
        }
        if self.audio_url == MISSING_DATA {
            missing.push("audio_url");
        }
        missing
    }
}

/// Substitute the sentinel for a value the extractor could not find.
pub fn or_missing(value: Option<String>) -> String {
    value.unwrap_or_else(|| MISSING_DATA.to_string())
}

/// What one looked-up term resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// The dictionary returned a page with at least one match.
    Found(Entry),
    /// Zero matches, or the lookup itself failed.
    Missing(Term),
}

impl Outcome {
    pub fn term(&self) -> &str {
        match self {
            Outcome::Found(entry) => &entry.source_term,
            Outcome::Missing(term) => term,
        }
    }
}
