//! Term↔id vocabulary and bag-of-words projection.
//!
//! A [`Vocabulary`] maps every distinct term in the corpus to a stable
//! integer id and tracks each term's document frequency. After
//! [`Vocabulary::filter_extremes`] prunes rare and ubiquitous terms and
//! compacts ids contiguously from zero, the vocabulary is frozen:
//! [`Vocabulary::doc2bow`] projects any token list into sparse
//! `(term_id, count)` pairs against it. Ids are never reused or renumbered
//! outside that one compaction, so vector dimensionality stays consistent
//! across training and inference.
//!
//! The vocabulary persists as a JSONL artifact so a projector can be re-run
//! later against frozen ids without retraining.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CorpusError, Result};

/// Bidirectional term↔id mapping with per-term document frequencies.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    token2id: FxHashMap<String, u32>,
    /// Ordered so iteration and compaction are deterministic. May contain id
    /// gaps after pruning or a lossy load; compaction closes them.
    id2token: BTreeMap<u32, String>,
    doc_freqs: FxHashMap<u32, u32>,
    num_docs: u64,
    next_id: u32,
}

/// Header line of the persisted artifact.
#[derive(Debug, Serialize, Deserialize)]
struct VocabHeader {
    num_docs: u64,
}

/// One term entry in the persisted artifact.
#[derive(Debug, Serialize, Deserialize)]
struct VocabEntry {
    id: u32,
    term: String,
    df: u32,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary from per-document final token lists.
    pub fn from_documents<I, S>(docs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[String]>,
    {
        let mut vocab = Self::new();
        for doc in docs {
            vocab.add_document(doc.as_ref());
        }
        vocab
    }

    /// Register one document's final token list.
    ///
    /// Every distinct term gets an id on first sight; document frequencies
    /// count each term once per document.
    pub fn add_document(&mut self, tokens: &[String]) {
        self.num_docs += 1;
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for term in tokens {
            if !seen.insert(term.as_str()) {
                continue;
            }
            let id = match self.token2id.get(term) {
                Some(&id) => id,
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    self.token2id.insert(term.clone(), id);
                    self.id2token.insert(id, term.clone());
                    id
                }
            };
            *self.doc_freqs.entry(id).or_insert(0) += 1;
        }
    }

    /// Number of terms currently in the vocabulary.
    pub fn len(&self) -> usize {
        self.token2id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token2id.is_empty()
    }

    /// Number of documents seen by [`Vocabulary::add_document`].
    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    pub fn id_of(&self, term: &str) -> Option<u32> {
        self.token2id.get(term).copied()
    }

    pub fn term_of(&self, id: u32) -> Option<&str> {
        self.id2token.get(&id).map(String::as_str)
    }

    /// Document frequency of a term, 0 if absent.
    pub fn doc_freq(&self, term: &str) -> u32 {
        self.id_of(term)
            .and_then(|id| self.doc_freqs.get(&id).copied())
            .unwrap_or(0)
    }

    /// Terms in id order.
    pub fn terms(&self) -> impl Iterator<Item = (u32, &str)> {
        self.id2token.iter().map(|(&id, term)| (id, term.as_str()))
    }

    /// Remove terms in fewer than `no_below` documents (hard floor) or in
    /// more than `no_above * num_docs` documents (fraction of the total),
    /// then renumber the survivors contiguously from zero.
    pub fn filter_extremes(&mut self, no_below: u32, no_above: f64) {
        let ceiling = no_above * self.num_docs as f64;
        let before = self.len();

        let doomed: Vec<u32> = self
            .id2token
            .keys()
            .copied()
            .filter(|id| {
                let df = self.doc_freqs.get(id).copied().unwrap_or(0);
                df < no_below || f64::from(df) > ceiling
            })
            .collect();
        for id in doomed {
            if let Some(term) = self.id2token.remove(&id) {
                self.token2id.remove(&term);
            }
            self.doc_freqs.remove(&id);
        }

        self.compactify();
        info!(
            kept = self.len(),
            removed = before - self.len(),
            no_below,
            no_above,
            "vocabulary pruned"
        );
    }

    /// Renumber ids contiguously from zero, preserving relative order.
    pub fn compactify(&mut self) {
        let old: Vec<(u32, String)> = std::mem::take(&mut self.id2token).into_iter().collect();
        let old_freqs = std::mem::take(&mut self.doc_freqs);
        self.token2id.clear();

        for (new_id, (old_id, term)) in old.into_iter().enumerate() {
            let new_id = new_id as u32;
            self.token2id.insert(term.clone(), new_id);
            self.id2token.insert(new_id, term);
            if let Some(df) = old_freqs.get(&old_id) {
                self.doc_freqs.insert(new_id, *df);
            }
        }
        self.next_id = self.id2token.len() as u32;
    }

    /// Project one token list into sparse `(term_id, count)` pairs, sorted
    /// by id. Out-of-vocabulary tokens are silently dropped.
    pub fn doc2bow(&self, tokens: &[String]) -> Vec<(u32, u32)> {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for token in tokens {
            if let Some(id) = self.id_of(token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }

    /// Persist as a JSONL artifact: a header line with the document count,
    /// then one term entry per line in id order.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file = fs::File::create(path)
            .map_err(|e| CorpusError::io(path.display().to_string(), e))?;
        let header = serde_json::to_string(&VocabHeader {
            num_docs: self.num_docs,
        })?;
        writeln!(file, "{header}").map_err(|e| CorpusError::io(path.display().to_string(), e))?;

        for (id, term) in self.terms() {
            let entry = serde_json::to_string(&VocabEntry {
                id,
                term: term.to_string(),
                df: self.doc_freqs.get(&id).copied().unwrap_or(0),
            })?;
            writeln!(file, "{entry}")
                .map_err(|e| CorpusError::io(path.display().to_string(), e))?;
        }
        Ok(())
    }

    /// Load a persisted artifact.
    ///
    /// A missing or unparseable header is fatal; individually malformed term
    /// lines are skipped with a logged warning and the read continues.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CorpusError::io(path.display().to_string(), e))?;
        let mut lines = contents.lines();

        let header_line = lines.next().ok_or_else(|| CorpusError::InvalidArtifact {
            path: path.display().to_string(),
            reason: "empty file".to_string(),
        })?;
        let header: VocabHeader =
            serde_json::from_str(header_line).map_err(|e| CorpusError::InvalidArtifact {
                path: path.display().to_string(),
                reason: format!("bad header: {e}"),
            })?;

        let mut vocab = Self {
            num_docs: header.num_docs,
            ..Self::default()
        };
        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<VocabEntry>(line) {
                Ok(entry) => {
                    vocab.token2id.insert(entry.term.clone(), entry.id);
                    vocab.id2token.insert(entry.id, entry.term);
                    vocab.doc_freqs.insert(entry.id, entry.df);
                    vocab.next_id = vocab.next_id.max(entry.id + 1);
                }
                Err(err) => {
                    warn!(file = %path.display(), line = line_no + 1, %err, "bad vocabulary entry, skipping");
                }
            }
        }
        Ok(vocab)
    }
}
