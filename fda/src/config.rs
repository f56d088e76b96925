use core::fmt;

use crate::errors::{FdaError, Result};

/// How the score of a feature shrinks each time an emitted sentence covers it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decay {
    /// `score / (1 + k)`.
    Harmonic,

    /// `score * factor^k`, with `0 < factor < 1`.
    Geometric(f64),

    /// The score never changes.
    Disabled,
}

impl Decay {
    /// Classifies a raw decay factor: `>= 1` is harmonic, `(0, 1)` is geometric, `<= 0` is
    /// disabled.
    pub fn from_factor(factor: f64) -> Self {
        if factor >= 1.0 {
            Self::Harmonic
        } else if factor > 0.0 {
            Self::Geometric(factor)
        } else {
            Self::Disabled
        }
    }
}

/// Selection parameters.
///
/// The value is built once, validated, and then shared by reference with every component.
///
/// # Examples
///
/// ```
/// use fda::Config;
///
/// let config = Config::new()
///     .ngram_order(2)
///     .output_words(Some(1000))
///     .decay_factor(1.0);
/// assert!(config.validate().is_ok());
/// assert_eq!(2, config.get_ngram_order());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub(crate) ngram_order: usize,
    pub(crate) output_words: Option<usize>,
    pub(crate) idf_exponent: f64,
    pub(crate) ngram_length_exponent: f64,
    pub(crate) decay_factor: f64,
    pub(crate) sentence_length_exponent: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ngram_order: 3,
            output_words: Some(100_000),
            idf_exponent: 1.0,
            ngram_length_exponent: 1.0,
            decay_factor: 0.5,
            sentence_length_exponent: 1.0,
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum n-gram order.
    pub const fn ngram_order(mut self, order: usize) -> Self {
        self.ngram_order = order;
        self
    }

    /// Sets the output budget in source-side words. `None` means unlimited.
    pub const fn output_words(mut self, words: Option<usize>) -> Self {
        self.output_words = words;
        self
    }

    /// Sets the exponent of the IDF-like rarity term. 0 disables it.
    pub const fn idf_exponent(mut self, exponent: f64) -> Self {
        self.idf_exponent = exponent;
        self
    }

    /// Sets the exponent applied to the n-gram length. 0 disables it.
    pub const fn ngram_length_exponent(mut self, exponent: f64) -> Self {
        self.ngram_length_exponent = exponent;
        self
    }

    /// Sets the decay factor. See [`Decay::from_factor`].
    pub const fn decay_factor(mut self, factor: f64) -> Self {
        self.decay_factor = factor;
        self
    }

    /// Sets the exponent of the sentence length normalizer. 0 disables it.
    pub const fn sentence_length_exponent(mut self, exponent: f64) -> Self {
        self.sentence_length_exponent = exponent;
        self
    }

    pub const fn get_ngram_order(&self) -> usize {
        self.ngram_order
    }

    pub const fn get_output_words(&self) -> Option<usize> {
        self.output_words
    }

    pub const fn get_idf_exponent(&self) -> f64 {
        self.idf_exponent
    }

    pub const fn get_ngram_length_exponent(&self) -> f64 {
        self.ngram_length_exponent
    }

    pub const fn get_decay_factor(&self) -> f64 {
        self.decay_factor
    }

    pub const fn get_sentence_length_exponent(&self) -> f64 {
        self.sentence_length_exponent
    }

    /// Gets the decay regime selected by the decay factor.
    pub fn decay(&self) -> Decay {
        Decay::from_factor(self.decay_factor)
    }

    /// Checks that every parameter is usable.
    ///
    /// # Errors
    ///
    /// [`FdaError::InvalidArgument`] will be returned if the n-gram order is 0 or a real-valued
    /// parameter is not finite.
    pub fn validate(&self) -> Result<()> {
        if self.ngram_order == 0 {
            return Err(FdaError::invalid_argument(
                "ngram_order",
                "must be at least 1",
            ));
        }
        for (arg, value) in [
            ("idf_exponent", self.idf_exponent),
            ("ngram_length_exponent", self.ngram_length_exponent),
            ("decay_factor", self.decay_factor),
            ("sentence_length_exponent", self.sentence_length_exponent),
        ] {
            if !value.is_finite() {
                return Err(FdaError::invalid_argument(
                    arg,
                    format!("must be finite, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Config {
    /// Renders the parameters as command-line flags.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "--decay {} --idf-exponent {} --length-exponent {} --order {} \
             --sentence-length-exponent {} --words {}",
            self.decay_factor,
            self.idf_exponent,
            self.ngram_length_exponent,
            self.ngram_order,
            self.sentence_length_exponent,
            self.output_words.unwrap_or(0),
        )
    }
}
