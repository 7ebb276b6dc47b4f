// Field extraction for result pages from the Stephen Li Taishanese
// vocabulary site.
//
// The pages have no stable schema. A hit looks roughly like:
//
//   <b>你好</b> [nei2 hau2]<br>
//   english: hello; how are you<br>
//   <a href="audio/nihao.mp3" target="sound">...</a>
//
// so each field is located independently and falls back to the
// sentinel on its own.

use crate::EntryExtractor;
use cantocards_acquire::normalize::collapse_whitespace;
use cantocards_model::{or_missing, Entry, Outcome};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Text the site prints when a search found nothing.
pub const NO_MATCHES_MARKER: &str = "Number of matches: 0";

/// Everything after an `english:` label up to the end of its text node.
static ENGLISH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)english:\s*(.*)").expect("valid regex"));

/// First `[...]` span with non-empty content.
static PRONUNCIATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*([^\[\]]*?[^\[\]\s][^\[\]]*?)\s*\]").expect("valid regex"));

/// Extractor for stephen-li.com result pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct StephenLiExtractor {
    /// Extract the bracketed pronunciation and require it for completeness.
    pub track_pronunciation: bool,
}

impl StephenLiExtractor {
    pub fn new(track_pronunciation: bool) -> Self {
        Self { track_pronunciation }
    }
}

impl EntryExtractor for StephenLiExtractor {
    fn extract(&self, term: &str, html: &str) -> Outcome {
        let document = Html::parse_document(html);

        if has_no_matches(html, &document) {
            return Outcome::Missing(term.to_string());
        }

        let body_sel = Selector::parse("body").expect("valid selector");
        let body = document
            .select(&body_sel)
            .next()
            .unwrap_or_else(|| document.root_element());

        let pronunciation = if self.track_pronunciation {
            Some(or_missing(extract_pronunciation(body)))
        } else {
            None
        };

        Outcome::Found(Entry {
            source_term: term.to_string(),
            character: or_missing(extract_character(body)),
            english: or_missing(extract_english(body)),
            pronunciation,
            audio_url: or_missing(extract_audio_url(body)),
        })
    }
}

/// The zero-matches marker wins over anything else on the page.
///
/// Checked against the raw markup and against the rendered text, since
/// the count is sometimes split across lines or wrapped in tags.
fn has_no_matches(html: &str, document: &Html) -> bool {
    if html.contains(NO_MATCHES_MARKER) {
        return true;
    }
    let text: String = document.root_element().text().collect();
    collapse_whitespace(&text).contains(NO_MATCHES_MARKER)
}

/// Text of the first bolded element.
fn extract_character(body: ElementRef) -> Option<String> {
    let bold_sel = Selector::parse("b, strong").expect("valid selector");
    body.select(&bold_sel)
        .map(|b| collapse_whitespace(&b.text().collect::<String>()))
        .next()
        .filter(|s| !s.is_empty())
}

/// Gloss following the `english:` label, stopping at the next tag.
///
/// Text nodes end exactly at markup boundaries, so matching within a
/// single node never runs into the following element.
fn extract_english(body: ElementRef) -> Option<String> {
    body.text()
        .find_map(|node| ENGLISH_RE.captures(node))
        .map(|caps| collapse_whitespace(&caps[1]))
        .filter(|s| !s.is_empty())
}

/// Content of the first bracketed span anywhere in the body text.
fn extract_pronunciation(body: ElementRef) -> Option<String> {
    let text: String = body.text().collect();
    PRONUNCIATION_RE
        .captures(&text)
        .map(|caps| collapse_whitespace(&caps[1]))
}

/// `href` of the first anchor that has one.
fn extract_audio_url(body: ElementRef) -> Option<String> {
    let a_sel = Selector::parse("a[href]").expect("valid selector");
    body.select(&a_sel)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .next()
        .filter(|s| !s.is_empty())
}
