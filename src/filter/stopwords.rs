//! Language stopword lists.
//!
//! Thin adapter over the `stop-words` crate. The corpus this pipeline was
//! built for is Spanish-language central-bank text, so Spanish is the
//! default; unknown language codes fall back to it.

use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

/// Stopwords for a language, as a lowercase lookup set.
///
/// Accepts ISO codes or English names ("es"/"spanish", "en"/"english", ...).
/// Unrecognized languages fall back to Spanish.
pub fn language_stopwords(language: &str) -> FxHashSet<String> {
    let lang = match language.to_lowercase().as_str() {
        "es" | "spanish" => LANGUAGE::Spanish,
        "en" | "english" => LANGUAGE::English,
        "pt" | "portuguese" => LANGUAGE::Portuguese,
        "fr" | "french" => LANGUAGE::French,
        "de" | "german" => LANGUAGE::German,
        "it" | "italian" => LANGUAGE::Italian,
        "nl" | "dutch" => LANGUAGE::Dutch,
        "ru" | "russian" => LANGUAGE::Russian,
        _ => LANGUAGE::Spanish,
    };

    get(lang).iter().map(|s| s.to_lowercase()).collect()
}
