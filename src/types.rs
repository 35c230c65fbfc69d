//! Core annotated-text types.
//!
//! A [`Document`] owns an ordered list of [`Sentence`]s, each an ordered list
//! of [`Token`]s, plus free-form string [`Metadata`]. Annotation (tokenization,
//! sentence segmentation, POS and entity tagging) happens at the
//! [`crate::annotate::Annotator`] boundary; these types only carry the result.
//!
//! Documents are immutable after assembly. Derived quantities (retained
//! sentence/word counts) are computed by the corpus pass from a filter
//! specification, never written back onto shared annotation state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata key identifying a document; required by the assembler because
/// vocabulary and bag-of-words outputs are keyed by it downstream.
pub const DOC_ID: &str = "doc_id";

/// Conventional metadata key for the originating file name.
pub const META_FILE: &str = "file";

/// Conventional metadata key for the source directory / collection name.
pub const META_SOURCE: &str = "source";

/// Free-form document metadata. Ordered so serialized output is stable.
pub type Metadata = BTreeMap<String, String>;

/// The atomic annotated unit: one word-like span with linguistic tags.
///
/// POS and entity tags are opaque strings owned by whichever annotator
/// produced them (e.g. Universal Dependencies tags from spaCy). An empty tag
/// means "untagged".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form as it appeared in the text.
    pub text: String,
    /// Lowercased form; the unit all filtering and counting operates on.
    pub lower: String,
    /// Part-of-speech tag, or empty if untagged.
    #[serde(default)]
    pub pos: String,
    /// Named-entity type, or empty if not part of an entity.
    #[serde(default)]
    pub ent_type: String,
    /// Whether the surface form is entirely alphabetic.
    pub is_alpha: bool,
}

impl Token {
    /// Build a token from its surface form, deriving `lower` and `is_alpha`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lower = text.to_lowercase();
        let is_alpha = !text.is_empty() && text.chars().all(char::is_alphabetic);
        Self {
            text,
            lower,
            pos: String::new(),
            ent_type: String::new(),
            is_alpha,
        }
    }

    /// Set the part-of-speech tag.
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = pos.into();
        self
    }

    /// Set the named-entity type.
    pub fn with_ent_type(mut self, ent_type: impl Into<String>) -> Self {
        self.ent_type = ent_type.into();
        self
    }
}

/// A contiguous token span bounded by sentence segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Raw token count, before any filtering.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Total characters across surface forms.
    pub fn chars(&self) -> usize {
        self.tokens.iter().map(|t| t.text.chars().count()).sum()
    }
}

/// An annotated document: sentences plus source metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub sentences: Vec<Sentence>,
    pub meta: Metadata,
}

impl Document {
    pub fn new(sentences: Vec<Sentence>, meta: Metadata) -> Self {
        Self { sentences, meta }
    }

    /// The required document identifier.
    ///
    /// The assembler guarantees presence; this only returns `None` for
    /// documents constructed by hand without one.
    pub fn doc_id(&self) -> Option<&str> {
        self.meta.get(DOC_ID).map(String::as_str)
    }

    /// Metadata lookup, empty string if absent.
    pub fn meta_or_empty(&self, key: &str) -> &str {
        self.meta.get(key).map(String::as_str).unwrap_or("")
    }

    /// Raw token count across all sentences.
    pub fn num_tokens(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }
}
