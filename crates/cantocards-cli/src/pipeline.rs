// End-to-end batch run: word list -> lookups -> classification ->
// CSV + audio + reports.

use crate::config::PipelineConfig;
use anyhow::{Context, Result};
use cantocards_acquire::{load_level, lookup_all, AudioFetcher, DictionarySearch, HskLevel};
use cantocards_export::AudioReport;
use cantocards_model::{ClassifiedResults, Term};
use cantocards_parse::{classify_all, EntryExtractor};
use std::sync::Arc;

/// The services a run talks to.
pub struct Services<'a> {
    pub search: Arc<dyn DictionarySearch>,
    pub audio: &'a dyn AudioFetcher,
    pub extractor: &'a dyn EntryExtractor,
}

#[derive(Debug)]
pub struct RunSummary {
    pub results: ClassifiedResults,
    pub csv_rows: usize,
    pub audio: AudioReport,
}

/// Run the pipeline over the word list(s) for `level`.
pub async fn run(
    config: &PipelineConfig,
    level: HskLevel,
    services: Services<'_>,
) -> Result<RunSummary> {
    let terms = load_level(&config.word_list_dir, level)?;
    run_terms(config, &terms, services).await
}

/// Run the pipeline over an explicit term list.
pub async fn run_terms(
    config: &PipelineConfig,
    terms: &[Term],
    services: Services<'_>,
) -> Result<RunSummary> {
    tracing::info!(terms = terms.len(), concurrency = config.concurrency, "Looking up terms");
    let raw = lookup_all(services.search, terms, config.concurrency).await;

    if let Some(dir) = &config.cache_html_dir {
        for result in &raw {
            if let Ok(html) = &result.response {
                if let Err(e) = cantocards_export::cache_html(dir, &result.term, html) {
                    tracing::warn!(term = %result.term, error = %e, "Failed to cache raw HTML");
                }
            }
        }
    }

    let results = ClassifiedResults::from_outcomes(classify_all(services.extractor, raw));
    anyhow::ensure!(
        results.total() == terms.len(),
        "{} terms in, {} outcomes out",
        terms.len(),
        results.total()
    );
    log_summary(&results);

    let csv_rows = cantocards_export::write_csv(
        &config.csv_path,
        &results.complete,
        config.track_pronunciation,
    )
    .context("CSV export failed")?;

    let audio = cantocards_export::download_audio(
        services.audio,
        &config.site_root,
        &config.media_dir,
        &results.complete,
    )
    .await
    .context("Audio export failed")?;

    cantocards_export::write_missing_report(&config.missing_report, &results)?;
    if let Some(path) = &config.results_json {
        cantocards_export::write_results_json(path, &results)?;
    }

    Ok(RunSummary {
        results,
        csv_rows,
        audio,
    })
}

fn log_summary(results: &ClassifiedResults) {
    let pct = results.percentages();
    tracing::info!(
        total = results.total(),
        complete = results.complete.len(),
        incomplete = results.incomplete.len(),
        missing = results.missing.len(),
        "Classified results"
    );
    tracing::info!(
        complete = format!("{:.1}%", pct.complete),
        incomplete = format!("{:.1}%", pct.incomplete),
        missing = format!("{:.1}%", pct.missing),
        "Bucket shares"
    );
}
