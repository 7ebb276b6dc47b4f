use crate::media::sound_tag;
use crate::{write_atomic, ExportError, Result};
use cantocards_model::Entry;
use std::path::Path;

/// Write complete entries as a semicolon-delimited flashcard CSV.
///
/// Columns: `mandarin;character;english;[pronunciation;]audio`. The
/// audio column holds a `[sound:<character>.mp3]` tag matching the file
/// the audio export writes. Any existing file is replaced as a whole.
pub fn write_csv(path: &Path, complete: &[Entry], with_pronunciation: bool) -> Result<usize> {
    let rows: Vec<&Entry> = complete.iter().filter(|e| e.is_complete()).collect();
    if rows.len() != complete.len() {
        tracing::warn!(
            skipped = complete.len() - rows.len(),
            "Skipping incomplete entries passed to CSV export"
        );
    }

    let bytes = render_csv(&rows, with_pronunciation)?;
    write_atomic(path, &bytes)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote flashcard CSV");

    Ok(rows.len())
}

fn render_csv(rows: &[&Entry], with_pronunciation: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote(b'"')
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    let mut header = vec!["mandarin", "character", "english"];
    if with_pronunciation {
        header.push("pronunciation");
    }
    header.push("audio");
    writer.write_record(&header)?;

    for entry in rows {
        let audio = sound_tag(&entry.character);
        let mut record = vec![
            entry.source_term.as_str(),
            entry.character.as_str(),
            entry.english.as_str(),
        ];
        if with_pronunciation {
            record.push(entry.pronunciation.as_deref().unwrap_or(""));
        }
        record.push(&audio);
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}
