//! Cleanup of extracted document text before chunking

use regex::Regex;
use std::sync::OnceLock;

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"[ \t]+").expect("hard-coded regex"))
}

fn page_number_regex() -> &'static Regex {
    static PAGE_NUMBER: OnceLock<Regex> = OnceLock::new();
    PAGE_NUMBER.get_or_init(|| Regex::new(r"^\s*\d+\s*$").expect("hard-coded regex"))
}

/// Clean extracted text.
///
/// Drops isolated page-number lines and short header/footer lines
/// (≤ 20 characters after trimming), and collapses runs of spaces and tabs.
/// The thresholds are heuristics tuned for book-style PDF extractions.
pub fn clean_text(text: &str) -> String {
    let cleaned: Vec<String> = text
        .lines()
        .filter(|line| !page_number_regex().is_match(line))
        .map(|line| whitespace_regex().replace_all(line.trim(), " ").into_owned())
        .filter(|line| line.len() > 20)
        .collect();

    cleaned.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_page_number_lines() {
        let text = "A sentence long enough to keep around.\n  42  \nAnother line that also survives cleaning.";
        let cleaned = clean_text(text);

        assert!(!cleaned.contains("42"));
        assert_eq!(cleaned.lines().count(), 2);
    }

    #[test]
    fn drops_short_header_lines() {
        let text = "CHAPTER ONE\nThe trend is your friend until the end when it bends.";
        let cleaned = clean_text(text);

        assert!(!cleaned.contains("CHAPTER"));
        assert!(cleaned.contains("trend is your friend"));
    }

    #[test]
    fn collapses_runs_of_spaces() {
        let text = "Price   closed  above\tthe 50-day moving average.";
        assert_eq!(
            clean_text(text),
            "Price closed above the 50-day moving average."
        );
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_text(""), "");
    }
}
