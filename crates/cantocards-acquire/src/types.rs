use cantocards_model::Term;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One term paired with whatever the dictionary sent back for it.
#[derive(Debug)]
pub struct RawResult {
    pub term: Term,
    pub response: Result<String, LookupError>,
}

/// Why a lookup produced no page. Every variant classifies as Missing.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("lookup task ended without a result")]
    Aborted,
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Network(err)
        }
    }
}

/// Languages offered by the dictionary's search-language selector.
///
/// The display name is the value submitted in the `Select1` form field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceLanguage {
    Taishanese,
    #[serde(rename = "IPA")]
    Ipa,
    Cantonese,
    #[default]
    Mandarin,
    English,
}

impl SourceLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceLanguage::Taishanese => "Taishanese",
            SourceLanguage::Ipa => "IPA",
            SourceLanguage::Cantonese => "Cantonese",
            SourceLanguage::Mandarin => "Mandarin",
            SourceLanguage::English => "English",
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "taishanese" => Ok(SourceLanguage::Taishanese),
            "ipa" => Ok(SourceLanguage::Ipa),
            "cantonese" => Ok(SourceLanguage::Cantonese),
            "mandarin" => Ok(SourceLanguage::Mandarin),
            "english" => Ok(SourceLanguage::English),
            other => Err(format!("Unsupported search language: {other}")),
        }
    }
}
