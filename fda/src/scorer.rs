//! Feature and sentence scores.

use crate::config::{Config, Decay};
use crate::feature::FeatureTable;
use crate::sentence::Sentence;
use crate::utils::pow_unless_one;

/// Computes the undecayed score of a feature.
///
/// The score is `order^length_exponent * idf^idf_exponent` where
/// `idf = -ln(max(train_count, 1) / n_train_tokens)`. A zero exponent drops its factor.
/// A score that is not finite is replaced by 0 so that decayed scores stay comparable.
pub fn static_score(
    order: usize,
    train_count: usize,
    n_train_tokens: usize,
    length_exponent: f64,
    idf_exponent: f64,
) -> f64 {
    let mut score = 1.0;
    if length_exponent != 0.0 {
        score *= pow_unless_one(order as f64, length_exponent);
    }
    if idf_exponent != 0.0 {
        let count = train_count.max(1) as f64;
        let idf = -(count / n_train_tokens as f64).ln();
        score *= pow_unless_one(idf, idf_exponent);
    }
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Applies `k` rounds of decay to `static_score`.
#[inline(always)]
pub fn decayed_score(static_score: f64, k: usize, decay: Decay) -> f64 {
    match decay {
        Decay::Harmonic => static_score / (1.0 + k as f64),
        Decay::Geometric(factor) => static_score * factor.powf(k as f64),
        Decay::Disabled => static_score,
    }
}

/// Sums the current scores of every n-gram window of `sentence` found in `table`.
///
/// When the sentence length exponent is non-zero, the sum of a non-empty sentence is divided by
/// its length raised to that exponent.
pub fn sentence_score(sentence: &Sentence, table: &FeatureTable, config: &Config) -> f64 {
    let mut score = 0.0;
    for ngram in sentence.ngrams(config.ngram_order) {
        if let Some(f) = table.get(ngram.tokens()) {
            score += f.current_score;
        }
    }
    if config.sentence_length_exponent != 0.0 && !sentence.is_empty() {
        score /= pow_unless_one(sentence.len() as f64, config.sentence_length_exponent);
    }
    score
}
