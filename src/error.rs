//! Error types for corpus construction.

use thiserror::Error;

/// Errors surfaced by corpus construction and persistence.
///
/// Source-level read and annotation failures are deliberately *not* variants
/// here: per the partial-failure policy they are logged and the offending
/// item skipped, so corpus construction keeps going. Only conditions that
/// would corrupt downstream keying or artifacts are fatal.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// A required metadata field was absent during document assembly.
    /// Downstream vocabulary and bag-of-words outputs are keyed by it, so
    /// the document cannot be admitted.
    #[error("document from {context} is missing required metadata field `{field}`")]
    MissingMetadata { field: String, context: String },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error on {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A persisted vocabulary artifact was unusable as a whole (e.g. missing
    /// header). Individually malformed term entries are skipped with a
    /// warning instead.
    #[error("invalid vocabulary artifact {path}: {reason}")]
    InvalidArtifact { path: String, reason: String },
}

impl CorpusError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing_metadata(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingMetadata {
            field: field.into(),
            context: context.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CorpusError>;
