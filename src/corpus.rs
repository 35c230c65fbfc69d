//! Corpus orchestration.
//!
//! [`Corpus::build`] runs the whole pipeline in strict phase order:
//!
//! 1. assemble annotated documents from a source (ingest),
//! 2. train the bigram model on the shared filtered-sentence derivation,
//! 3. train the trigram model on the bigram-transformed derivation,
//! 4. build the vocabulary from the merged token stream and prune it.
//!
//! Each phase completes fully before the next begins; the phrase models and
//! vocabulary are immutable once built. All derived streams come from one
//! [`SentenceSelection`], so phrase training and bag-of-words projection are
//! guaranteed to consume identical filtered input.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use tracing::info;

use crate::annotate::{Annotator, DocumentAssembler};
use crate::error::Result;
use crate::filter::{SentenceSelection, TokenFilter};
use crate::phrase::{NgramPipeline, PhraseConfig};
use crate::sources::TextSource;
use crate::types::Document;
use crate::vocab::Vocabulary;

/// Named wordlists for per-document match counting.
pub type Wordlists = BTreeMap<String, FxHashSet<String>>;

/// Configuration for a corpus build.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// Token filter specification.
    pub filter: TokenFilter,
    /// Sentences need strictly more raw tokens than this to be retained.
    pub min_sentence_tokens: usize,
    /// Phrase-formation policy for both the bigram and trigram passes.
    pub phrase: PhraseConfig,
    /// Terms in fewer than this many documents are pruned.
    pub no_below: u32,
    /// Terms in more than this fraction of documents are pruned.
    pub no_above: f64,
    /// Annotation batch size; throughput only, no behavioral effect.
    pub batch_size: usize,
    /// Named wordlists; per-document match counts appear in tabular output.
    pub wordlists: Wordlists,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            filter: TokenFilter::default(),
            min_sentence_tokens: 0,
            phrase: PhraseConfig::default(),
            no_below: 5,
            no_above: 0.50,
            batch_size: 32,
            wordlists: Wordlists::new(),
        }
    }
}

/// An assembled corpus with its frozen transformation artifacts.
#[derive(Debug, Clone)]
pub struct Corpus {
    docs: Vec<Document>,
    selection: SentenceSelection,
    ngrams: NgramPipeline,
    vocab: Vocabulary,
    wordlists: Wordlists,
}

impl Corpus {
    /// Build a corpus from scratch: assemble, train n-grams, build and prune
    /// the vocabulary.
    pub fn build<S, A>(source: &S, annotator: &A, config: CorpusConfig) -> Result<Self>
    where
        S: TextSource + ?Sized,
        A: Annotator,
    {
        Self::build_inner(source, annotator, config, None, None)
    }

    /// Build a corpus against pre-trained artifacts.
    ///
    /// Skips n-gram training and/or vocabulary construction for whichever
    /// artifact is supplied, so projection reuses frozen merges and ids —
    /// the inference-time path, keeping vector dimensionality identical to
    /// the training run.
    pub fn build_with_artifacts<S, A>(
        source: &S,
        annotator: &A,
        config: CorpusConfig,
        ngrams: Option<NgramPipeline>,
        vocab: Option<Vocabulary>,
    ) -> Result<Self>
    where
        S: TextSource + ?Sized,
        A: Annotator,
    {
        Self::build_inner(source, annotator, config, ngrams, vocab)
    }

    fn build_inner<S, A>(
        source: &S,
        annotator: &A,
        config: CorpusConfig,
        ngrams: Option<NgramPipeline>,
        vocab: Option<Vocabulary>,
    ) -> Result<Self>
    where
        S: TextSource + ?Sized,
        A: Annotator,
    {
        // Phase 1: ingest. Must be complete before any derivation runs.
        let assembler = DocumentAssembler::new(config.batch_size);
        let docs = assembler.assemble(annotator, source.pairs())?;
        info!(docs = docs.len(), "documents assembled");

        let selection = SentenceSelection::new(config.filter, config.min_sentence_tokens);

        // Phases 2-3: phrase training over the shared derivation. The
        // closure restarts the identical stream for each pass.
        let ngrams = ngrams.unwrap_or_else(|| {
            NgramPipeline::train(
                || docs.iter().flat_map(|doc| selection.retained_sentences(doc)),
                &config.phrase,
            )
        });

        // Phase 4: vocabulary over the merged token stream.
        let vocab = match vocab {
            Some(vocab) => vocab,
            None => {
                let mut vocab = Vocabulary::from_documents(
                    docs.iter().map(|doc| merged_tokens(doc, &selection, &ngrams)),
                );
                vocab.filter_extremes(config.no_below, config.no_above);
                vocab
            }
        };

        info!(
            docs = docs.len(),
            terms = vocab.len(),
            bigrams = ngrams.bigrams.len(),
            trigrams = ngrams.trigrams.len(),
            "corpus ready"
        );

        Ok(Self {
            docs,
            selection,
            ngrams,
            vocab,
            wordlists: config.wordlists,
        })
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn selection(&self) -> &SentenceSelection {
        &self.selection
    }

    pub fn ngrams(&self) -> &NgramPipeline {
        &self.ngrams
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn wordlists(&self) -> &Wordlists {
        &self.wordlists
    }

    /// Final token list per document (filtered, n-gram-merged), paired with
    /// the document id, in ingestion order.
    pub fn doc_tokens(&self) -> impl Iterator<Item = (&str, Vec<String>)> + '_ {
        self.docs.iter().map(|doc| {
            let id = doc.doc_id().unwrap_or("");
            (id, merged_tokens(doc, &self.selection, &self.ngrams))
        })
    }

    /// One sparse bag-of-words vector per document, in ingestion order.
    pub fn bows(&self) -> impl Iterator<Item = (&str, Vec<(u32, u32)>)> + '_ {
        self.doc_tokens()
            .map(|(id, tokens)| (id, self.vocab.doc2bow(&tokens)))
    }
}

/// A document's final token list: retained sentences, token filter, then the
/// frozen bigram and trigram merges, concatenated across sentences.
fn merged_tokens(
    doc: &Document,
    selection: &SentenceSelection,
    ngrams: &NgramPipeline,
) -> Vec<String> {
    let mut tokens = Vec::new();
    for sentence in selection.retained_sentences(doc) {
        tokens.extend(ngrams.apply(&sentence));
    }
    tokens
}
