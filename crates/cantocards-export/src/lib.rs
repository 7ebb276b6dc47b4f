use std::fs;
use std::path::{Path, PathBuf};

pub mod flashcards;
pub mod media;
pub mod report;

pub use flashcards::write_csv;
pub use media::{download_audio, AudioReport};
pub use report::{cache_html, write_missing_report, write_results_json};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

pub(crate) fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `contents` to `path` via a sibling temp file and a rename.
///
/// Readers see either the previous file or the complete new one.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir(parent)?;
    }

    let tmp = temp_path(path);
    let write_err = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, contents).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        write_err(source)
    })
}

/// Async counterpart of [`write_atomic`] for the download path.
///
/// The parent directory must already exist.
pub(crate) async fn write_atomic_async(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    let write_err = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Err(source) = tokio::fs::write(&tmp, contents).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(source));
    }
    if let Err(source) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(source));
    }
    Ok(())
}

/// Sibling `<name>.tmp` path used while a file is being written.
fn temp_path(path: &Path) -> PathBuf {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    path.with_file_name(tmp_name)
}
