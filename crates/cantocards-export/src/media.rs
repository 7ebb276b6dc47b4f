use crate::{create_dir, write_atomic_async, Result};
use cantocards_acquire::AudioFetcher;
use cantocards_model::{Entry, Term, MISSING_DATA};
use serde::Serialize;
use std::path::Path;

/// File stem for a character: path separators become `_`.
pub fn file_stem(character: &str) -> String {
    character.replace(['/', '\\'], "_")
}

/// Media file name for an entry's audio clip, e.g. `你好.mp3`.
pub fn media_file_name(character: &str) -> String {
    format!("{}.mp3", file_stem(character))
}

/// Anki playback tag pointing at the downloaded clip.
pub fn sound_tag(character: &str) -> String {
    format!("[sound:{}]", media_file_name(character))
}

/// Resolve an audio link from a result page against the site root.
/// Absolute links pass through unchanged.
pub fn audio_download_url(site_root: &str, audio_url: &str) -> String {
    if audio_url.starts_with("http://") || audio_url.starts_with("https://") {
        return audio_url.to_string();
    }
    format!(
        "{}/{}",
        site_root.trim_end_matches('/'),
        audio_url.trim_start_matches('/')
    )
}

/// What an audio export did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AudioReport {
    pub downloaded: usize,
    /// Already present in the media directory.
    pub skipped: usize,
    /// Terms whose clip could not be fetched.
    pub failed: Vec<Term>,
}

/// Download the audio clip of every entry into `media_dir`.
///
/// Clips are saved as `<character>.mp3`. Files that already exist are
/// left alone, so running the export again fetches nothing new. A clip
/// that cannot be fetched is logged and counted; failing to create the
/// directory or write a file aborts the export.
pub async fn download_audio(
    fetcher: &dyn AudioFetcher,
    site_root: &str,
    media_dir: &Path,
    entries: &[Entry],
) -> Result<AudioReport> {
    create_dir(media_dir)?;
    let mut report = AudioReport::default();

    let downloadable = entries
        .iter()
        .filter(|e| e.character != MISSING_DATA && e.audio_url != MISSING_DATA);

    for entry in downloadable {
        let path = media_dir.join(media_file_name(&entry.character));
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "Audio already present");
            report.skipped += 1;
            continue;
        }

        let url = audio_download_url(site_root, &entry.audio_url);
        let bytes = match fetcher.fetch(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(term = %entry.source_term, url = %url, error = %e, "Audio download failed");
                report.failed.push(entry.source_term.clone());
                continue;
            }
        };

        // Clips appear under their final name only once complete.
        write_atomic_async(&path, &bytes).await?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "Downloaded audio");
        report.downloaded += 1;
    }

    tracing::info!(
        downloaded = report.downloaded,
        skipped = report.skipped,
        failed = report.failed.len(),
        dir = %media_dir.display(),
        "Audio export finished"
    );

    Ok(report)
}
