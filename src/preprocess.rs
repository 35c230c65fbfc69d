//! Cleanup of extracted text before annotation.
//!
//! Text pulled out of PDFs and scans arrives with hyphenated line breaks,
//! glued digits, stray short lines and layout junk. These functions repair
//! the worst of it so the annotator sees running prose. [`clean_extracted`]
//! composes them in the order that works for extraction output.

use once_cell::sync::Lazy;
use regex::Regex;

static HYPHEN_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"-(?:\r?\n)+").unwrap());
// \p{L}, not [[:alpha:]]: the POSIX class is ASCII-only and would miss
// accented letters.
static DASH_BEFORE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\W)–(\p{L}+)").unwrap());
static DASH_AFTER_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{L}+)–(\W)").unwrap());
static GLUED_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{L}{2,}?)(\d+)").unwrap());

/// Remove every occurrence of the given junk characters.
pub fn strip_chars(text: &str, junk: &str) -> String {
    if junk.is_empty() {
        return text.to_string();
    }
    text.chars().filter(|c| !junk.contains(*c)).collect()
}

/// Drop lines with `min_chars` characters or fewer.
///
/// Extraction output is full of page numbers, headers and table fragments
/// that show up as short lines; real prose lines are long.
pub fn drop_short_lines(text: &str, min_chars: usize) -> String {
    let mut kept = String::with_capacity(text.len());
    for line in text.lines() {
        if line.chars().count() > min_chars {
            kept.push_str(line);
            kept.push('\n');
        }
    }
    kept
}

/// Rejoin words hyphenated across line breaks ("econo-\nmía" → "economía").
pub fn join_hyphenated(text: &str) -> String {
    HYPHEN_BREAK.replace_all(text, "").into_owned()
}

/// Collapse all whitespace runs (including newlines) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Detach en-dashes glued to the first or last word of a fragment.
pub fn detach_dashes(text: &str) -> String {
    let first = DASH_BEFORE_WORD.replace_all(text, "$1– $2");
    DASH_AFTER_WORD.replace_all(&first, "$1 –$2").into_owned()
}

/// Separate digits glued to the end of a word ("inflación2024" → "inflación 2024").
pub fn split_digits(text: &str) -> String {
    GLUED_DIGITS.replace_all(text, "$1 $2").into_owned()
}

/// Full cleanup pass for freshly extracted text.
///
/// Strips junk characters, drops short lines, then (if anything survives)
/// rejoins hyphenated words, collapses whitespace and detaches dashes and
/// digits.
pub fn clean_extracted(text: &str, junk: &str, min_chars: usize) -> String {
    let cleaned = strip_chars(text, junk);
    let cleaned = drop_short_lines(&cleaned, min_chars);
    if cleaned.is_empty() {
        return cleaned;
    }
    let cleaned = join_hyphenated(&cleaned);
    let cleaned = collapse_whitespace(&cleaned);
    let cleaned = detach_dashes(&cleaned);
    split_digits(&cleaned)
}
