//! Token and sentence filtering.
//!
//! [`TokenFilter`] is the filter specification: a set of optional criteria
//! that a token must satisfy simultaneously to be retained. An empty filter
//! is the identity — every token passes. [`SentenceSelection`] bundles the
//! filter with a minimum sentence length into the one shared derivation that
//! produces the retained lowercase token stream; phrase training and
//! bag-of-words projection both consume this derivation, so they are
//! guaranteed identical filtered input.

mod stopwords;

pub use stopwords::language_stopwords;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::types::{Document, Sentence, Token};

/// Filter specification for individual tokens.
///
/// Each criterion is optional; an unset criterion is vacuously true. All set
/// criteria must hold (logical AND). Pure and O(1) per token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenFilter {
    /// Keep only tokens whose surface form is entirely alphabetic.
    #[serde(default)]
    pub alpha_only: bool,
    /// Exclude tokens whose lowercase form is in this set.
    #[serde(default)]
    pub stopwords: Option<FxHashSet<String>>,
    /// Exclude tokens carrying one of these part-of-speech tags.
    #[serde(default)]
    pub exclude_postags: Option<FxHashSet<String>>,
    /// Exclude tokens carrying one of these named-entity types.
    #[serde(default)]
    pub exclude_entities: Option<FxHashSet<String>>,
}

impl TokenFilter {
    /// The identity filter: every token passes.
    pub fn none() -> Self {
        Self::default()
    }

    /// Keep only alphabetic tokens.
    pub fn alpha_only(mut self) -> Self {
        self.alpha_only = true;
        self
    }

    /// Exclude the given stopwords (matched against the lowercase form).
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = Some(words.into_iter().map(|w| w.into().to_lowercase()).collect());
        self
    }

    /// Exclude stopwords for a named language, via the `stop-words` lists.
    pub fn with_language_stopwords(mut self, language: &str) -> Self {
        self.stopwords = Some(language_stopwords(language));
        self
    }

    /// Exclude tokens with any of the given part-of-speech tags.
    pub fn without_postags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_postags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Exclude tokens with any of the given named-entity types.
    pub fn without_entities<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_entities = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the token survives every configured criterion.
    pub fn passes(&self, token: &Token) -> bool {
        if self.alpha_only && !token.is_alpha {
            return false;
        }
        if let Some(stops) = &self.stopwords {
            if stops.contains(&token.lower) {
                return false;
            }
        }
        if let Some(tags) = &self.exclude_postags {
            if tags.contains(&token.pos) {
                return false;
            }
        }
        if let Some(types) = &self.exclude_entities {
            if types.contains(&token.ent_type) {
                return false;
            }
        }
        true
    }
}

/// Sentences of `doc` whose raw token count strictly exceeds `min_tokens`.
///
/// Original order is preserved; short sentences are dropped silently.
pub fn long_sentences(doc: &Document, min_tokens: usize) -> impl Iterator<Item = &Sentence> {
    doc.sentences.iter().filter(move |s| s.len() > min_tokens)
}

/// The shared filtered-sentence derivation.
///
/// Bundles the token filter with the sentence-length threshold so every
/// pipeline pass (phrase training, vocabulary building, projection) derives
/// the retained token stream through the same pure function of
/// `(document, selection)`.
#[derive(Debug, Clone, Default)]
pub struct SentenceSelection {
    pub filter: TokenFilter,
    /// Sentences must have strictly more raw tokens than this to be kept.
    pub min_tokens: usize,
}

impl SentenceSelection {
    pub fn new(filter: TokenFilter, min_tokens: usize) -> Self {
        Self { filter, min_tokens }
    }

    /// Retained sentences of a document as lists of lowercase forms.
    ///
    /// Sentence length is judged on *raw* token count; the token filter
    /// applies afterwards, inside each retained sentence. A retained
    /// sentence may therefore end up with fewer (even zero) tokens.
    pub fn retained_sentences(&self, doc: &Document) -> Vec<Vec<String>> {
        long_sentences(doc, self.min_tokens)
            .map(|sent| {
                sent.tokens
                    .iter()
                    .filter(|t| self.filter.passes(t))
                    .map(|t| t.lower.clone())
                    .collect()
            })
            .collect()
    }

    /// Derived per-document counts: retained sentences and surviving words.
    pub fn doc_counts(&self, doc: &Document) -> (usize, usize) {
        let mut sents = 0;
        let mut words = 0;
        for sent in long_sentences(doc, self.min_tokens) {
            sents += 1;
            words += sent.tokens.iter().filter(|t| self.filter.passes(t)).count();
        }
        (sents, words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;

    fn sent(words: &[&str]) -> Sentence {
        Sentence::new(words.iter().map(|w| Token::new(*w)).collect())
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        let filter = TokenFilter::none();
        for word in ["banco", "el", "2024", "", "política"] {
            assert!(filter.passes(&Token::new(word)), "{word:?} should pass");
        }
    }

    #[test]
    fn test_stopword_criterion() {
        let filter = TokenFilter::none().with_stopwords(["el", "la"]);
        assert!(!filter.passes(&Token::new("el")));
        assert!(!filter.passes(&Token::new("El"))); // lowercase form matched
        assert!(!filter.passes(&Token::new("la")));
        assert!(filter.passes(&Token::new("banco")));
        assert!(filter.passes(&Token::new("los")));
    }

    #[test]
    fn test_alpha_criterion() {
        let filter = TokenFilter::none().alpha_only();
        assert!(filter.passes(&Token::new("inflación")));
        assert!(!filter.passes(&Token::new("3.5%")));
        assert!(!filter.passes(&Token::new("covid-19")));
    }

    #[test]
    fn test_postag_and_entity_criteria() {
        let filter = TokenFilter::none()
            .without_postags(["DET", "PUNCT"])
            .without_entities(["PER"]);

        assert!(!filter.passes(&Token::new("el").with_pos("DET")));
        assert!(!filter.passes(&Token::new("Uribe").with_ent_type("PER")));
        assert!(filter.passes(&Token::new("banco").with_pos("NOUN")));
        // Untagged tokens are unaffected by tag criteria.
        assert!(filter.passes(&Token::new("banco")));
    }

    #[test]
    fn test_criteria_combine_with_and() {
        let filter = TokenFilter::none().alpha_only().with_stopwords(["el"]);
        assert!(!filter.passes(&Token::new("el"))); // alpha but stopword
        assert!(!filter.passes(&Token::new("42"))); // not alpha
        assert!(filter.passes(&Token::new("banco")));
    }

    #[test]
    fn test_long_sentences_strict_boundary() {
        let doc = Document::new(
            vec![sent(&["a", "b"]), sent(&["a", "b", "c"]), Sentence::default()],
            Metadata::new(),
        );
        // min_tokens = 2: only the 3-token sentence survives (len > 2).
        let kept: Vec<_> = long_sentences(&doc, 2).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].len(), 3);
        // min_tokens = 0 keeps everything non-empty.
        assert_eq!(long_sentences(&doc, 0).count(), 2);
    }

    #[test]
    fn test_retained_sentences_filters_inside_kept_sentences() {
        let selection = SentenceSelection::new(TokenFilter::none().with_stopwords(["el"]), 1);
        let doc = Document::new(
            vec![sent(&["el", "banco", "central"]), sent(&["corto"])],
            Metadata::new(),
        );
        let retained = selection.retained_sentences(&doc);
        assert_eq!(retained, vec![vec!["banco".to_string(), "central".to_string()]]);
    }

    #[test]
    fn test_doc_counts() {
        let selection = SentenceSelection::new(TokenFilter::none().with_stopwords(["el"]), 1);
        let doc = Document::new(
            vec![sent(&["el", "banco", "central"]), sent(&["la", "tasa"])],
            Metadata::new(),
        );
        let (sents, words) = selection.doc_counts(&doc);
        assert_eq!(sents, 2);
        assert_eq!(words, 4); // "el" dropped; "la" not in stoplist here
    }

    #[test]
    fn test_derivation_is_repeatable() {
        let selection = SentenceSelection::new(
            TokenFilter::none().alpha_only().with_stopwords(["de", "la"]),
            2,
        );
        let doc = Document::new(
            vec![sent(&["la", "junta", "del", "banco", "subió", "la", "tasa"])],
            Metadata::new(),
        );
        let first = selection.retained_sentences(&doc);
        let second = selection.retained_sentences(&doc);
        assert_eq!(first, second);
    }
}
