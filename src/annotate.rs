//! Annotation boundary and document assembly.
//!
//! Linguistic annotation (tokenization, sentence segmentation, tagging) is
//! someone else's job — spaCy, Stanza, or whatever NLP service the deployment
//! uses — reached through the [`Annotator`] trait. [`BasicAnnotator`] is a
//! rule-based stand-in (Unicode whitespace tokenization, `.!?` sentence
//! splits, no tags) so the pipeline is exercisable without an external
//! service.
//!
//! [`DocumentAssembler`] streams `(text, metadata)` pairs through the
//! annotator in batches, attaches metadata, and yields one [`Document`] per
//! input pair in input order.

use rayon::prelude::*;
use tracing::warn;

use crate::error::{CorpusError, Result};
use crate::types::{Document, Metadata, Sentence, Token, DOC_ID};

/// External annotation pipeline boundary.
///
/// Implementations must be deterministic per input text. Errors are
/// per-document: the assembler logs and skips the failed item.
pub trait Annotator: Sync {
    fn annotate(&self, text: &str) -> std::result::Result<Vec<Sentence>, String>;
}

/// Rule-based annotator: sentences split on `.`, `!`, `?`; tokens split on
/// Unicode whitespace with leading/trailing punctuation trimmed; no POS or
/// entity tags.
///
/// Not an NLP system — a convenience so tests and small corpora run without
/// an external service.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAnnotator;

impl BasicAnnotator {
    fn tokenize(fragment: &str) -> Vec<Token> {
        fragment
            .split_whitespace()
            .filter_map(|word| {
                let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Token::new(trimmed))
                }
            })
            .collect()
    }
}

impl Annotator for BasicAnnotator {
    fn annotate(&self, text: &str) -> std::result::Result<Vec<Sentence>, String> {
        let sentences = text
            .split(['.', '!', '?'])
            .map(Self::tokenize)
            .filter(|tokens| !tokens.is_empty())
            .map(Sentence::new)
            .collect();
        Ok(sentences)
    }
}

/// Streams `(text, metadata)` pairs through an annotator, yielding assembled
/// documents.
///
/// Batching affects throughput only: items within a batch are annotated in
/// parallel, but results are emitted in input order, 1:1 with input pairs.
/// A missing `doc_id` is fatal for that document (the whole assembly pass
/// errors); annotation failures are logged and the item skipped.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    batch_size: usize,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self { batch_size: 32 }
    }
}

impl DocumentAssembler {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Assemble all pairs into documents, preserving input order.
    pub fn assemble<A, I>(&self, annotator: &A, pairs: I) -> Result<Vec<Document>>
    where
        A: Annotator,
        I: IntoIterator<Item = (String, Metadata)>,
    {
        let mut docs = Vec::new();
        let mut batch: Vec<(String, Metadata)> = Vec::with_capacity(self.batch_size);

        for pair in pairs {
            batch.push(pair);
            if batch.len() == self.batch_size {
                self.flush(annotator, &mut batch, &mut docs)?;
            }
        }
        self.flush(annotator, &mut batch, &mut docs)?;

        Ok(docs)
    }

    fn flush<A: Annotator>(
        &self,
        annotator: &A,
        batch: &mut Vec<(String, Metadata)>,
        docs: &mut Vec<Document>,
    ) -> Result<()> {
        let annotated: Vec<(std::result::Result<Vec<Sentence>, String>, Metadata)> = batch
            .par_drain(..)
            .map(|(text, meta)| (annotator.annotate(&text), meta))
            .collect();

        for (result, meta) in annotated {
            if !meta.contains_key(DOC_ID) {
                let context = meta
                    .get(crate::types::META_FILE)
                    .cloned()
                    .unwrap_or_else(|| "unnamed source".to_string());
                return Err(CorpusError::missing_metadata(DOC_ID, context));
            }
            match result {
                Ok(sentences) => docs.push(Document::new(sentences, meta)),
                Err(err) => {
                    let id = meta.get(DOC_ID).map(String::as_str).unwrap_or("?");
                    warn!(doc_id = id, error = %err, "annotation failed, skipping document");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str) -> Metadata {
        Metadata::from([(DOC_ID.to_string(), id.to_string())])
    }

    #[test]
    fn test_basic_annotator_sentences_and_tokens() {
        let sentences = BasicAnnotator.annotate("El banco subió la tasa. Los mercados reaccionaron.").unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].len(), 5);
        assert_eq!(sentences[0].tokens[0].lower, "el");
        assert_eq!(sentences[1].tokens[2].text, "reaccionaron");
    }

    #[test]
    fn test_basic_annotator_trims_punctuation() {
        let sentences = BasicAnnotator.annotate("«banco», dijo").unwrap();
        let lowers: Vec<_> = sentences[0].tokens.iter().map(|t| t.lower.as_str()).collect();
        assert_eq!(lowers, vec!["banco", "dijo"]);
        assert!(sentences[0].tokens[0].is_alpha);
    }

    #[test]
    fn test_basic_annotator_empty_text() {
        assert!(BasicAnnotator.annotate("").unwrap().is_empty());
        assert!(BasicAnnotator.annotate(" . . ").unwrap().is_empty());
    }

    #[test]
    fn test_assembler_preserves_order_across_batches() {
        let pairs: Vec<_> = (1..=7)
            .map(|i| (format!("documento número {i}."), meta(&format!("{i:0>7}"))))
            .collect();

        let assembler = DocumentAssembler::new(3);
        let docs = assembler.assemble(&BasicAnnotator, pairs).unwrap();

        assert_eq!(docs.len(), 7);
        for (i, doc) in docs.iter().enumerate() {
            assert_eq!(doc.doc_id().unwrap(), format!("{:0>7}", i + 1));
        }
    }

    #[test]
    fn test_assembler_missing_doc_id_is_fatal() {
        let pairs = vec![("texto sin identificador.".to_string(), Metadata::new())];
        let err = DocumentAssembler::default()
            .assemble(&BasicAnnotator, pairs)
            .unwrap_err();
        assert!(matches!(err, CorpusError::MissingMetadata { ref field, .. } if field == DOC_ID));
    }

    #[test]
    fn test_assembler_skips_failed_annotation() {
        struct Flaky;
        impl Annotator for Flaky {
            fn annotate(&self, text: &str) -> std::result::Result<Vec<Sentence>, String> {
                if text.contains("mal") {
                    Err("parse failure".to_string())
                } else {
                    BasicAnnotator.annotate(text)
                }
            }
        }

        let pairs = vec![
            ("texto bueno.".to_string(), meta("d1")),
            ("texto mal formado.".to_string(), meta("d2")),
            ("otro bueno.".to_string(), meta("d3")),
        ];
        let docs = DocumentAssembler::default().assemble(&Flaky, pairs).unwrap();
        let ids: Vec<_> = docs.iter().filter_map(Document::doc_id).collect();
        assert_eq!(ids, vec!["d1", "d3"]);
    }

    #[test]
    fn test_batch_size_does_not_change_output() {
        let pairs: Vec<_> = (0..10)
            .map(|i| (format!("frase {i} del corpus."), meta(&format!("{i}"))))
            .collect();

        let small = DocumentAssembler::new(2)
            .assemble(&BasicAnnotator, pairs.clone())
            .unwrap();
        let large = DocumentAssembler::new(100)
            .assemble(&BasicAnnotator, pairs)
            .unwrap();
        assert_eq!(small, large);
    }
}
