//! Text helpers shared by the extractor and the link discoverer.
//!
//! Truncation counts characters, not bytes, so a cut never splits a code
//! point. Every helper here is idempotent: applying it to its own output
//! changes nothing.

/// Collapses every run of whitespace into a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps at most `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Case-insensitive containment of any needle; needles must be lower-case
pub fn contains_any(haystack_lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack_lower.contains(needle))
}
