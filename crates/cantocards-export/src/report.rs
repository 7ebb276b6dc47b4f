use crate::media::file_stem;
use crate::{create_dir, write_atomic, ExportError, Result};
use cantocards_model::{ClassifiedResults, Entry, Percentages, Term};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Write the terms that produced no entry, one per line, after a count line.
pub fn write_missing_report(path: &Path, results: &ClassifiedResults) -> Result<()> {
    let mut text = format!(
        "# {} of {} terms had no dictionary entry\n",
        results.missing.len(),
        results.total()
    );
    for term in &results.missing {
        text.push_str(term);
        text.push('\n');
    }

    write_atomic(path, text.as_bytes())?;
    tracing::info!(path = %path.display(), missing = results.missing.len(), "Wrote missing-term report");
    Ok(())
}

#[derive(Serialize)]
struct ResultsDocument<'a> {
    generated_at: String,
    total: usize,
    percentages: Percentages,
    complete: &'a [Entry],
    incomplete: &'a [Entry],
    missing: &'a [Term],
}

/// Dump all three buckets and the percentages as pretty JSON.
pub fn write_results_json(path: &Path, results: &ClassifiedResults) -> Result<()> {
    let doc = ResultsDocument {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total: results.total(),
        percentages: results.percentages(),
        complete: &results.complete,
        incomplete: &results.incomplete,
        missing: &results.missing,
    };
    let json = serde_json::to_string_pretty(&doc)?;
    write_atomic(path, json.as_bytes())?;
    tracing::info!(path = %path.display(), total = doc.total, "Wrote results JSON");
    Ok(())
}

/// Keep a copy of a raw result page for diagnosing extraction problems.
pub fn cache_html(dir: &Path, term: &str, html: &str) -> Result<()> {
    create_dir(dir)?;
    let path = dir.join(format!("{}.html", file_stem(term)));
    fs::write(&path, html).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = html.len(), "Cached raw HTML");
    Ok(())
}
