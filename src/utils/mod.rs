//! Shared text utilities.
//!
//! Small helpers used by both extraction paths: markup stripping,
//! word counting and character-safe excerpts.

use std::sync::OnceLock;

use regex::Regex;

fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid markup regex"))
}

/// Remove HTML/XML-style tags from text.
pub fn strip_markup(text: &str) -> String {
    markup_re().replace_all(text, "").into_owned()
}

/// Count whitespace-separated tokens after stripping markup.
pub fn word_count(text: &str) -> u32 {
    strip_markup(text).split_whitespace().count() as u32
}

/// First `max_chars` characters of a string (UTF-8 safe).
pub fn char_excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Normalize CRLF/CR line endings to LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
