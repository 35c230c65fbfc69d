//! Phrase (collocation) detection.
//!
//! Adjacent token pairs that co-occur often enough are merged into a single
//! compound token ("banco" + "central" → "banco_central"). Detection is a
//! one-shot batch training pass over the retained token stream; the trained
//! model is frozen and applying it is deterministic and side-effect-free.
//!
//! [`NgramPipeline`] chains two models: a bigram model trained on the raw
//! stream, then a trigram model trained on the bigram-transformed stream.
//! Application order is fixed — bigram before trigram, never the reverse —
//! because trigram merges are expressed over already-merged bigram tokens.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Scoring policy for phrase formation.
///
/// A pair `(a, b)` merges iff `count(a, b) >= min_count` and, when
/// `threshold` is positive, `score(a, b) > threshold`, where
///
/// ```text
/// score(a, b) = (count(a, b) - min_count) * vocab_size / (count(a) * count(b))
/// ```
///
/// `vocab_size` is the number of distinct unigrams seen in training. A
/// non-positive `threshold` disables the score test entirely, leaving a pure
/// minimum-count rule (a pair seen exactly `min_count` times scores 0, so a
/// `> 0.0` comparison would wrongly reject it). Both knobs are configuration
/// inputs, never hardcoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseConfig {
    /// Pairs seen fewer times than this never merge.
    pub min_count: u64,
    /// Score a pair must strictly exceed to merge.
    pub threshold: f64,
    /// Joiner placed between the members of a compound token.
    pub delimiter: String,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            min_count: 20,
            threshold: 10.0,
            delimiter: "_".to_string(),
        }
    }
}

impl PhraseConfig {
    /// Pure minimum-count policy: any pair seen `min_count` times merges.
    pub fn min_count(min_count: u64) -> Self {
        Self {
            min_count,
            threshold: 0.0,
            ..Self::default()
        }
    }

    /// Score-threshold policy with a low minimum count of 5.
    pub fn threshold(threshold: f64) -> Self {
        Self {
            min_count: 5,
            threshold,
            ..Self::default()
        }
    }
}

/// A trained phrase model: the frozen set of token pairs that merge.
///
/// Train once with [`PhraseModel::train`]; apply any number of times with
/// [`PhraseModel::apply`]. Tokens unseen in training pass through unmerged.
#[derive(Debug, Clone)]
pub struct PhraseModel {
    merges: FxHashMap<(String, String), String>,
    delimiter: String,
}

impl PhraseModel {
    /// Train over a stream of sentences (each a list of lowercase tokens).
    ///
    /// One-shot batch operation: unigram and adjacent-pair counts are
    /// collected over the whole stream, then the qualifying merges are
    /// frozen.
    pub fn train<I, S>(sentences: I, config: &PhraseConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[String]>,
    {
        let mut unigrams: FxHashMap<String, u64> = FxHashMap::default();
        let mut pairs: FxHashMap<(String, String), u64> = FxHashMap::default();

        for sentence in sentences {
            let tokens = sentence.as_ref();
            for token in tokens {
                *unigrams.entry(token.clone()).or_insert(0) += 1;
            }
            for window in tokens.windows(2) {
                let key = (window[0].clone(), window[1].clone());
                *pairs.entry(key).or_insert(0) += 1;
            }
        }

        let vocab_size = unigrams.len() as f64;
        let mut merges = FxHashMap::default();
        for ((a, b), pair_count) in pairs {
            if pair_count < config.min_count.max(1) {
                continue;
            }
            let count_a = unigrams[&a] as f64;
            let count_b = unigrams[&b] as f64;
            let score =
                (pair_count as f64 - config.min_count as f64) * vocab_size / (count_a * count_b);
            // A non-positive threshold means pure minimum-count policy; the
            // score test would reject pairs at exactly min_count (score 0).
            if config.threshold <= 0.0 || score > config.threshold {
                let merged = format!("{a}{}{b}", config.delimiter);
                merges.insert((a, b), merged);
            }
        }

        info!(
            phrases = merges.len(),
            vocab = unigrams.len(),
            "phrase model trained"
        );

        Self {
            merges,
            delimiter: config.delimiter.clone(),
        }
    }

    /// A model that never merges anything.
    pub fn identity() -> Self {
        Self {
            merges: FxHashMap::default(),
            delimiter: "_".to_string(),
        }
    }

    /// Number of frozen merge pairs.
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    /// The joiner used in compound tokens.
    pub fn delimiter(&self) -> &str {
        self.delimiter.as_str()
    }

    /// Apply the frozen model to one sentence.
    ///
    /// Scans left to right, merging non-overlapping qualifying adjacent
    /// pairs; everything else passes through unchanged. Deterministic and
    /// side-effect-free.
    pub fn apply(&self, tokens: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if i + 1 < tokens.len() {
                let key = (tokens[i].clone(), tokens[i + 1].clone());
                if let Some(merged) = self.merges.get(&key) {
                    out.push(merged.clone());
                    i += 2;
                    continue;
                }
            }
            out.push(tokens[i].clone());
            i += 1;
        }
        out
    }
}

/// The two chained phrase models: bigram first, then trigram.
#[derive(Debug, Clone)]
pub struct NgramPipeline {
    pub bigrams: PhraseModel,
    pub trigrams: PhraseModel,
}

impl NgramPipeline {
    /// Train both models over a restartable sentence stream.
    ///
    /// `stream` is called once per pass and must yield the same sentences
    /// each time (the caller derives it from the shared filtered-sentence
    /// derivation). Pass 1 trains the bigram model on the raw stream;
    /// pass 2 trains the trigram model on the bigram-transformed stream.
    /// The passes are strictly ordered: the bigram model is complete before
    /// trigram training begins.
    pub fn train<F, I>(mut stream: F, config: &PhraseConfig) -> Self
    where
        F: FnMut() -> I,
        I: IntoIterator<Item = Vec<String>>,
    {
        let bigrams = PhraseModel::train(stream(), config);
        let trigrams =
            PhraseModel::train(stream().into_iter().map(|sent| bigrams.apply(&sent)), config);
        Self { bigrams, trigrams }
    }

    /// A pipeline that never merges anything.
    pub fn identity() -> Self {
        Self {
            bigrams: PhraseModel::identity(),
            trigrams: PhraseModel::identity(),
        }
    }

    /// Apply both frozen models in the fixed order: bigram, then trigram.
    pub fn apply(&self, tokens: &[String]) -> Vec<String> {
        self.trigrams.apply(&self.bigrams.apply(tokens))
    }
}
