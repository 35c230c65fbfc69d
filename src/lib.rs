//! Streaming corpus construction for topic modeling.
//!
//! `rapid-corpus` assembles a text corpus from heterogeneous document sources
//! (directories of plain text, CSV rows, JSONL records, binaries behind an
//! extraction boundary) and turns it into a filtered, n-gram-aware
//! bag-of-words stream suitable for LDA-style topic models.
//!
//! The pipeline is phase-ordered and pull-based:
//!
//! ```text
//! sources → assembler → sentence filter → token filter
//!         → phrase detector (two training passes)
//!         → vocabulary builder → bag-of-words projector
//! ```
//!
//! Every stage after assembly consumes a derived view of the annotated
//! documents; the filtered sentence stream is a pure function of
//! (document, [`filter::SentenceSelection`]) so each pass sees identical
//! input. Shared artifacts ([`phrase::NgramPipeline`], [`vocab::Vocabulary`])
//! are built once and only read afterwards.
//!
//! # Quick start
//!
//! ```no_run
//! use rapid_corpus::annotate::BasicAnnotator;
//! use rapid_corpus::corpus::{Corpus, CorpusConfig};
//! use rapid_corpus::sources::DirSource;
//!
//! let source = DirSource::new("textos");
//! let config = CorpusConfig::default();
//! let corpus = Corpus::build(&source, &BasicAnnotator::default(), config).unwrap();
//! for (doc_id, bow) in corpus.bows() {
//!     println!("{doc_id}: {} distinct terms", bow.len());
//! }
//! ```

pub mod annotate;
pub mod corpus;
pub mod error;
pub mod filter;
pub mod phrase;
pub mod preprocess;
pub mod sources;
pub mod tabular;
pub mod types;
pub mod vocab;

pub use annotate::{Annotator, BasicAnnotator, DocumentAssembler};
pub use corpus::{Corpus, CorpusConfig};
pub use error::CorpusError;
pub use filter::{SentenceSelection, TokenFilter};
pub use phrase::{NgramPipeline, PhraseConfig, PhraseModel};
pub use types::{Document, Metadata, Sentence, Token, DOC_ID};
pub use vocab::Vocabulary;
