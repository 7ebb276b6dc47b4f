use cantocards_acquire::RawResult;
use cantocards_model::Outcome;

pub mod stephen_li;

pub use stephen_li::StephenLiExtractor;

/// Turns one dictionary result page into an [`Outcome`].
///
/// All knowledge of a particular site's markup lives behind this trait,
/// so a different dictionary only needs a new implementation.
/// Implementations never fail: fields that cannot be found hold the
/// `MISSING_DATA` sentinel, and a page with no matches is `Missing`.
pub trait EntryExtractor: Send + Sync {
    fn extract(&self, term: &str, html: &str) -> Outcome;
}

/// Classify one lookup result. A failed lookup is `Missing`.
pub fn classify(extractor: &dyn EntryExtractor, raw: RawResult) -> Outcome {
    let outcome = match raw.response {
        Ok(html) => extractor.extract(&raw.term, &html),
        Err(_) => Outcome::Missing(raw.term),
    };

    match &outcome {
        Outcome::Found(entry) if entry.is_complete() => {
            tracing::info!(
                term = %entry.source_term,
                character = %entry.character,
                english = %entry.english,
                "Found entry"
            );
        }
        Outcome::Found(entry) => {
            tracing::info!(
                term = %entry.source_term,
                missing = ?entry.missing_fields(),
                "Found incomplete entry"
            );
        }
        Outcome::Missing(term) => tracing::info!(term = %term, "No entry found"),
    }

    outcome
}

/// Classify a batch of lookup results, one outcome per result, same order.
pub fn classify_all(extractor: &dyn EntryExtractor, raw: Vec<RawResult>) -> Vec<Outcome> {
    raw.into_iter().map(|r| classify(extractor, r)).collect()
}
