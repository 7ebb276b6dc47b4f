use unicode_normalization::UnicodeNormalization;

/// Normalize a word-list line into a lookup term.
///
/// Applies NFC so that visually identical characters produce identical
/// search requests and media file names, then trims surrounding
/// whitespace and any byte-order mark left by Windows editors.
pub fn normalize_term(input: &str) -> String {
    let nfc: String = input.nfc().collect();
    nfc.trim_start_matches('\u{feff}').trim().to_string()
}

/// Collapse every run of whitespace (including newlines and NBSP) into a
/// single space and trim the ends.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
