use anyhow::Result;
use cantocards_acquire::{HskLevel, SourceLanguage, StephenLiClient};
use cantocards_parse::StephenLiExtractor;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod pipeline;

use config::PipelineConfig;
use pipeline::Services;

/// Every flag is optional; unset values come from `CANTOCARDS_*`
/// environment variables or built-in defaults.
#[derive(Parser)]
#[command(name = "cantocards")]
#[command(about = "Scrape Taishanese vocabulary for HSK word lists into Anki flashcards")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long)]
    utc: bool,

    /// HSK level to scrape: 1-6, or "all"
    #[arg(short, long, default_value = "1")]
    level: HskLevel,

    /// Directory containing HSK1.txt .. HSK6.txt
    #[arg(short, long)]
    word_list_dir: Option<PathBuf>,

    /// Output path for the flashcard CSV
    #[arg(short, long)]
    csv: Option<PathBuf>,

    /// Anki media directory for downloaded audio
    #[arg(short, long)]
    media_dir: Option<PathBuf>,

    /// Output path for the list of terms with no entry
    #[arg(long)]
    missing_report: Option<PathBuf>,

    /// Also dump every bucket as JSON to this path
    #[arg(long)]
    results_json: Option<PathBuf>,

    /// Save each raw result page into this directory
    #[arg(long)]
    cache_html: Option<PathBuf>,

    /// Search language sent to the dictionary (e.g. Mandarin, Cantonese)
    #[arg(long)]
    language: Option<SourceLanguage>,

    /// Maximum lookups in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds (at least 1)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Extract pronunciation and require it for complete entries
    #[arg(long)]
    pronunciation: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Cli {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(dir) = self.word_list_dir {
            config.word_list_dir = dir;
        }
        if let Some(path) = self.csv {
            config.csv_path = path;
        }
        if let Some(dir) = self.media_dir {
            config.media_dir = dir;
        }
        if let Some(path) = self.missing_report {
            config.missing_report = path;
        }
        if self.results_json.is_some() {
            config.results_json = self.results_json;
        }
        if self.cache_html.is_some() {
            config.cache_html_dir = self.cache_html;
        }
        if let Some(lang) = self.language {
            config.language = lang;
        }
        if let Some(n) = self.concurrency {
            config.concurrency = n.max(1);
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        if self.pronunciation {
            config.track_pronunciation = true;
        }
    }
}

fn init_logging(log_level: &LogLevel, utc: bool) {
    // Keep the HTML parser's internals quiet at debug/trace
    let level = match log_level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,hyper_util=info",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn,hyper_util=info",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z".to_string();

    if utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.utc);

    let level = cli.level;
    let mut config = PipelineConfig::from_env();
    cli.apply(&mut config);

    tracing::info!(
        level = %level,
        language = %config.language,
        pronunciation = config.track_pronunciation,
        "Starting vocabulary scrape"
    );

    let client = StephenLiClient::new(&config.endpoint, config.language, config.timeout)?;
    let extractor = StephenLiExtractor::new(config.track_pronunciation);
    let services = Services {
        search: Arc::new(client.clone()),
        audio: &client,
        extractor: &extractor,
    };

    let summary = pipeline::run(&config, level, services).await?;

    let pct = summary.results.percentages();
    tracing::info!(
        complete = summary.results.complete.len(),
        incomplete = summary.results.incomplete.len(),
        missing = summary.results.missing.len(),
        complete_pct = format!("{:.1}", pct.complete),
        incomplete_pct = format!("{:.1}", pct.incomplete),
        missing_pct = format!("{:.1}", pct.missing),
        csv_rows = summary.csv_rows,
        audio_downloaded = summary.audio.downloaded,
        audio_skipped = summary.audio.skipped,
        audio_failed = summary.audio.failed.len(),
        "Done"
    );

    Ok(())
}
