use cantocards_acquire::client::{SEARCH_ENDPOINT, SITE_ROOT};
use cantocards_acquire::SourceLanguage;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one batch run.
///
/// Built from defaults, then `CANTOCARDS_*` environment variables, then
/// command-line flags (applied in `main`).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Search form handler the lookups post to.
    pub endpoint: String,
    /// Prefix relative audio links are resolved against.
    pub site_root: String,
    pub language: SourceLanguage,
    /// Directory holding `HSK1.txt` .. `HSK6.txt`.
    pub word_list_dir: PathBuf,
    pub csv_path: PathBuf,
    /// Anki media folder the clips are downloaded into.
    pub media_dir: PathBuf,
    pub missing_report: PathBuf,
    pub results_json: Option<PathBuf>,
    pub cache_html_dir: Option<PathBuf>,
    /// Lookups in flight at once.
    pub concurrency: usize,
    /// Per-request timeout for searches and downloads.
    pub timeout: Duration,
    /// Extract pronunciation and require it for a complete entry.
    pub track_pronunciation: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoint: SEARCH_ENDPOINT.to_string(),
            site_root: SITE_ROOT.to_string(),
            language: SourceLanguage::Mandarin,
            word_list_dir: PathBuf::from("."),
            csv_path: PathBuf::from("cantocards.csv"),
            media_dir: PathBuf::from("collection.media"),
            missing_report: PathBuf::from("missing.txt"),
            results_json: None,
            cache_html_dir: None,
            concurrency: 4,
            timeout: Duration::from_secs(30),
            track_pronunciation: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Apply overrides from `var`, ignoring values that do not parse.
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = var("CANTOCARDS_ENDPOINT") {
            config.endpoint = v;
        }
        if let Some(v) = var("CANTOCARDS_SITE_ROOT") {
            config.site_root = v;
        }
        if let Some(lang) = var("CANTOCARDS_LANGUAGE").and_then(|v| v.parse().ok()) {
            config.language = lang;
        }
        if let Some(v) = var("CANTOCARDS_WORD_LIST_DIR") {
            config.word_list_dir = v.into();
        }
        if let Some(v) = var("CANTOCARDS_CSV_PATH") {
            config.csv_path = v.into();
        }
        if let Some(v) = var("CANTOCARDS_MEDIA_DIR") {
            config.media_dir = v.into();
        }
        if let Some(n) = var("CANTOCARDS_CONCURRENCY")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            config.concurrency = n;
        }
        // A zero timeout would fail every request before it is sent.
        if let Some(secs) = var("CANTOCARDS_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = var("CANTOCARDS_PRONUNCIATION") {
            config.track_pronunciation = matches!(
                v.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        config
    }
}
