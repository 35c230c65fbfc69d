//! Flat tabular outputs for downstream analysis.
//!
//! Two record shapes: per-document statistics (retained sentence and word
//! counts, per-wordlist match counts) and per-token annotations (document id,
//! sentence index, token index, lowercase form, POS). Both export to CSV.

use std::collections::BTreeMap;
use std::io;

use serde::Serialize;

use crate::corpus::Corpus;
use crate::error::{CorpusError, Result};
use crate::types::{META_FILE, META_SOURCE};

/// Per-document statistics under the corpus filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRecord {
    pub doc_id: String,
    pub file: String,
    pub source: String,
    /// Sentences retained by the length filter.
    pub sentences: usize,
    /// Tokens surviving the token filter inside retained sentences.
    pub words: usize,
    /// Matches per named wordlist, among surviving tokens.
    pub wordlist_counts: BTreeMap<String, usize>,
}

/// One retained token's annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRecord {
    pub doc_id: String,
    /// Sentence index within the document, before filtering.
    pub sentence: usize,
    /// Token index within the sentence, before filtering.
    pub token: usize,
    pub lower: String,
    pub pos: String,
}

/// Per-document statistics for every document in the corpus, in ingestion
/// order.
pub fn doc_records(corpus: &Corpus) -> Vec<DocRecord> {
    let selection = corpus.selection();
    corpus
        .docs()
        .iter()
        .map(|doc| {
            let (sentences, words) = selection.doc_counts(doc);

            let mut wordlist_counts: BTreeMap<String, usize> = corpus
                .wordlists()
                .keys()
                .map(|name| (name.clone(), 0))
                .collect();
            for sent in crate::filter::long_sentences(doc, selection.min_tokens) {
                for token in sent.tokens.iter().filter(|t| selection.filter.passes(t)) {
                    for (name, list) in corpus.wordlists() {
                        if list.contains(&token.lower) {
                            if let Some(count) = wordlist_counts.get_mut(name) {
                                *count += 1;
                            }
                        }
                    }
                }
            }

            DocRecord {
                doc_id: doc.doc_id().unwrap_or("").to_string(),
                file: doc.meta_or_empty(META_FILE).to_string(),
                source: doc.meta_or_empty(META_SOURCE).to_string(),
                sentences,
                words,
                wordlist_counts,
            }
        })
        .collect()
}

/// Annotations of every retained token in the corpus, in document order.
pub fn token_records(corpus: &Corpus) -> Vec<TokenRecord> {
    let selection = corpus.selection();
    let mut records = Vec::new();
    for doc in corpus.docs() {
        let doc_id = doc.doc_id().unwrap_or("").to_string();
        for (sent_idx, sent) in doc.sentences.iter().enumerate() {
            if sent.len() <= selection.min_tokens {
                continue;
            }
            for (tok_idx, token) in sent.tokens.iter().enumerate() {
                if !selection.filter.passes(token) {
                    continue;
                }
                records.push(TokenRecord {
                    doc_id: doc_id.clone(),
                    sentence: sent_idx,
                    token: tok_idx,
                    lower: token.lower.clone(),
                    pos: token.pos.clone(),
                });
            }
        }
    }
    records
}

/// Write document records as CSV: fixed columns, then one column per
/// wordlist name (sorted).
pub fn write_doc_records<W: io::Write>(writer: W, records: &[DocRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let wordlist_names: Vec<&str> = records
        .first()
        .map(|r| r.wordlist_counts.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let mut header = vec!["doc_id", "file", "source", "sentences", "words"];
    header.extend(&wordlist_names);
    csv.write_record(&header)
        .map_err(|e| CorpusError::csv("<writer>", e))?;

    for record in records {
        let mut row = vec![
            record.doc_id.clone(),
            record.file.clone(),
            record.source.clone(),
            record.sentences.to_string(),
            record.words.to_string(),
        ];
        for name in &wordlist_names {
            let count = record.wordlist_counts.get(*name).copied().unwrap_or(0);
            row.push(count.to_string());
        }
        csv.write_record(&row)
            .map_err(|e| CorpusError::csv("<writer>", e))?;
    }
    csv.flush()
        .map_err(|e| CorpusError::io("<writer>", e))?;
    Ok(())
}

/// Write token records as CSV.
pub fn write_token_records<W: io::Write>(writer: W, records: &[TokenRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)
            .map_err(|e| CorpusError::csv("<writer>", e))?;
    }
    csv.flush()
        .map_err(|e| CorpusError::io("<writer>", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::BasicAnnotator;
    use crate::corpus::{CorpusConfig, Wordlists};
    use crate::filter::TokenFilter;
    use crate::phrase::PhraseConfig;
    use crate::sources::TextSource;
    use crate::types::{Metadata, DOC_ID};
    use rustc_hash::FxHashSet;

    struct OneDoc(&'static str);

    impl TextSource for OneDoc {
        fn pairs(&self) -> Box<dyn Iterator<Item = (String, Metadata)> + '_> {
            let meta = Metadata::from([
                (DOC_ID.to_string(), "0000001".to_string()),
                ("file".to_string(), "informe.txt".to_string()),
                ("source".to_string(), "minutas".to_string()),
            ]);
            Box::new(std::iter::once((self.0.to_string(), meta)))
        }
    }

    fn build(text: &'static str, config: CorpusConfig) -> Corpus {
        Corpus::build(&OneDoc(text), &BasicAnnotator, config).unwrap()
    }

    fn lenient_with(wordlists: Wordlists, filter: TokenFilter) -> CorpusConfig {
        CorpusConfig {
            no_below: 1,
            no_above: 1.0,
            phrase: PhraseConfig::min_count(1000),
            wordlists,
            filter,
            ..CorpusConfig::default()
        }
    }

    #[test]
    fn test_doc_records_counts_and_wordlists() {
        let mut wordlists = Wordlists::new();
        wordlists.insert(
            "inflacion".to_string(),
            FxHashSet::from_iter(["precios".to_string(), "inflación".to_string()]),
        );

        let corpus = build(
            "la inflación golpeó los precios. los precios subieron.",
            lenient_with(wordlists, TokenFilter::default().with_stopwords(["la", "los"])),
        );
        let records = doc_records(&corpus);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.doc_id, "0000001");
        assert_eq!(record.file, "informe.txt");
        assert_eq!(record.source, "minutas");
        assert_eq!(record.sentences, 2);
        assert_eq!(record.words, 5); // inflación golpeó precios / precios subieron
        assert_eq!(record.wordlist_counts["inflacion"], 3);
    }

    #[test]
    fn test_token_records_keep_original_indices() {
        let corpus = build(
            "el banco decidió.",
            lenient_with(Wordlists::new(), TokenFilter::default().with_stopwords(["el"])),
        );
        let records = token_records(&corpus);

        // "el" is filtered but "banco" keeps token index 1.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].lower, "banco");
        assert_eq!(records[0].sentence, 0);
        assert_eq!(records[0].token, 1);
        assert_eq!(records[1].lower, "decidió");
        assert_eq!(records[1].token, 2);
    }

    #[test]
    fn test_write_doc_records_csv_shape() {
        let mut wordlists = Wordlists::new();
        wordlists.insert(
            "tasas".to_string(),
            FxHashSet::from_iter(["tasa".to_string()]),
        );
        let corpus = build(
            "la tasa subió.",
            lenient_with(wordlists, TokenFilter::default()),
        );

        let mut out = Vec::new();
        write_doc_records(&mut out, &doc_records(&corpus)).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), "doc_id,file,source,sentences,words,tasas");
        assert_eq!(lines.next().unwrap(), "0000001,informe.txt,minutas,1,3,1");
    }

    #[test]
    fn test_write_token_records_csv_shape() {
        let corpus = build("banco central.", lenient_with(Wordlists::new(), TokenFilter::default()));

        let mut out = Vec::new();
        write_token_records(&mut out, &token_records(&corpus)).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), "doc_id,sentence,token,lower,pos");
        assert_eq!(lines.next().unwrap(), "0000001,0,0,banco,");
        assert_eq!(lines.next().unwrap(), "0000001,0,1,central,");
    }

    #[test]
    fn test_write_doc_records_empty() {
        let mut out = Vec::new();
        write_doc_records(&mut out, &[]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim(), "doc_id,file,source,sentences,words");
    }
}
