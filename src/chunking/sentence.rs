//! Heuristic sentence splitting

use regex::Regex;
use std::sync::OnceLock;

fn boundary_regex() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| Regex::new(r"[.!?]\s+").expect("hard-coded regex"))
}

/// Split text into sentences.
///
/// Splits on boundaries immediately following `.`, `!`, or `?` when followed
/// by whitespace, then trims and discards empty pieces. This is a heuristic,
/// not a linguistic parser: abbreviations like "U.S." will mis-split.
/// Deterministic and total; empty or whitespace-only input yields an empty
/// vector.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in boundary_regex().find_iter(text) {
        // The match begins at the terminator; the sentence ends just after it.
        let end = m.start() + 1;
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = m.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}
