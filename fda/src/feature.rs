use hashbrown::HashMap;

use crate::config::{Config, Decay};
use crate::scorer;
use crate::sentence::{Sentence, Token};
use crate::utils::SplitMix64Builder;

/// Tracked state of one n-gram of the test vocabulary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feature {
    pub(crate) order: usize,
    pub(crate) train_count: usize,
    pub(crate) output_count: usize,
    pub(crate) static_score: f64,
    pub(crate) current_score: f64,
}

impl Feature {
    const fn new(order: usize) -> Self {
        Self {
            order,
            train_count: 0,
            output_count: 0,
            static_score: 0.0,
            current_score: 0.0,
        }
    }

    /// Gets the number of tokens of the n-gram.
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Gets the number of occurrences in the training corpus.
    ///
    /// Only counted when the IDF term is enabled.
    pub const fn train_count(&self) -> usize {
        self.train_count
    }

    /// Gets the number of times emitted sentences covered this n-gram.
    pub const fn output_count(&self) -> usize {
        self.output_count
    }

    /// Gets the score computed from corpus statistics, before any decay.
    pub const fn static_score(&self) -> f64 {
        self.static_score
    }

    /// Gets the live score read by sentence scoring.
    pub const fn current_score(&self) -> f64 {
        self.current_score
    }
}

/// Features keyed by n-gram.
///
/// Only n-grams observed in the test corpus are ever inserted. Records live in a single vector
/// and the map stores indices into it.
#[derive(Debug, Default)]
pub struct FeatureTable {
    ids: HashMap<Box<[Token]>, usize, SplitMix64Builder>,
    features: Vec<Feature>,
    n_bigrams: usize,
}

impl FeatureTable {
    /// Builds a table from every n-gram window of `sentences` up to `max_order`.
    ///
    /// Counts and scores start at zero.
    pub fn extract(sentences: &[Sentence], max_order: usize) -> Self {
        let mut table = Self::default();
        for s in sentences {
            for ngram in s.ngrams(max_order) {
                let tokens = ngram.tokens();
                if table.ids.contains_key(tokens) {
                    continue;
                }
                table.ids.insert(tokens.into(), table.features.len());
                table.features.push(Feature::new(tokens.len()));
                if tokens.len() == 2 {
                    table.n_bigrams += 1;
                }
            }
        }
        log::debug!(
            "extracted {} features ({} bigrams) from {} sentences",
            table.features.len(),
            table.n_bigrams,
            sentences.len()
        );
        table
    }

    /// Adds one to `train_count` of a feature for every occurrence of its n-gram in `sentences`.
    ///
    /// N-grams that are not in the table are ignored.
    ///
    /// # Returns
    ///
    /// The total number of tokens in `sentences`.
    pub fn accumulate_train_counts(&mut self, sentences: &[Sentence], max_order: usize) -> usize {
        let mut n_tokens = 0;
        for s in sentences {
            n_tokens += s.len();
            for ngram in s.ngrams(max_order) {
                if let Some(&id) = self.ids.get(ngram.tokens()) {
                    self.features[id].train_count += 1;
                }
            }
        }
        log::debug!("counted features over {} training tokens", n_tokens);
        n_tokens
    }

    /// Sets the static and current scores of every feature.
    ///
    /// `n_train_tokens` is the denominator of the IDF term and is ignored when it is disabled.
    pub fn init_scores(&mut self, config: &Config, n_train_tokens: usize) {
        for f in &mut self.features {
            f.static_score = scorer::static_score(
                f.order,
                f.train_count,
                n_train_tokens,
                config.ngram_length_exponent,
                config.idf_exponent,
            );
            f.current_score = f.static_score;
        }
    }

    /// Records that an emitted sentence covered its n-grams and decays their scores.
    ///
    /// # Returns
    ///
    /// The number of bigram features covered for the first time.
    pub fn update_after_emission(&mut self, sentence: &Sentence, config: &Config) -> usize {
        let decay = config.decay();
        let mut n_matched_bigrams = 0;
        for ngram in sentence.ngrams(config.ngram_order) {
            if let Some(&id) = self.ids.get(ngram.tokens()) {
                let f = &mut self.features[id];
                if f.order == 2 && f.output_count == 0 {
                    n_matched_bigrams += 1;
                }
                f.output_count += 1;
                if decay != Decay::Disabled {
                    f.current_score = scorer::decayed_score(f.static_score, f.output_count, decay);
                }
            }
        }
        n_matched_bigrams
    }

    /// Gets the feature of an n-gram.
    pub fn get(&self, tokens: &[Token]) -> Option<&Feature> {
        self.ids.get(tokens).map(|&id| &self.features[id])
    }

    /// Gets the number of distinct n-grams.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Checks if the table has no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Gets the number of distinct bigrams.
    pub const fn n_bigrams(&self) -> usize {
        self.n_bigrams
    }

    /// Iterates over n-grams and their features in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&[Token], &Feature)> {
        self.ids
            .iter()
            .map(|(tokens, &id)| (tokens.as_ref(), &self.features[id]))
    }
}
