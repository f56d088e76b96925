use core::hash::{Hash, Hasher};

use crate::errors::{FdaError, Result};

/// Word identifier.
///
/// Ids are assigned by a [`Vocabulary`](crate::Vocabulary) or by any other interner the caller
/// prefers; the selection engine treats them as opaque.
pub type Token = u32;

/// Tokenized sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    pub(crate) tokens: Vec<Token>,
}

impl Sentence {
    /// Creates a new [`Sentence`] from a sequence of tokens.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Token ids in reading order. An empty sequence is allowed.
    ///
    /// # Returns
    ///
    /// A new [`Sentence`].
    ///
    /// # Examples
    ///
    /// ```
    /// use fda::Sentence;
    ///
    /// let s = Sentence::new(vec![3, 1, 4]);
    /// assert_eq!(3, s.len());
    /// ```
    pub fn new<T>(tokens: T) -> Self
    where
        T: Into<Vec<Token>>,
    {
        Self {
            tokens: tokens.into(),
        }
    }

    /// Gets the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Checks if the sentence has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Gets a reference to the tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Iterates over every n-gram window of length `1..=max_order` that fits in the sentence.
    ///
    /// Windows are produced per start position, shortest first.
    ///
    /// # Examples
    ///
    /// ```
    /// use fda::Sentence;
    ///
    /// let s = Sentence::new(vec![7, 8, 9]);
    /// let ngrams: Vec<&[u32]> = s.ngrams(2).map(|ng| ng.tokens()).collect();
    /// let expected: Vec<&[u32]> = vec![&[7], &[7, 8], &[8], &[8, 9], &[9]];
    /// assert_eq!(expected, ngrams);
    /// ```
    pub fn ngrams(&self, max_order: usize) -> NgramIter<'_> {
        NgramIter {
            sentence: self,
            max_order,
            start: 0,
            len: 1,
        }
    }
}

/// A window of a [`Sentence`] used as a feature key.
///
/// Two n-grams are equal when they have the same length and the same tokens, regardless of the
/// sentence they come from.
#[derive(Debug, Clone, Copy)]
pub struct Ngram<'a> {
    sentence: &'a Sentence,
    start: usize,
    len: usize,
}

impl<'a> Ngram<'a> {
    /// Creates a view of `len` tokens starting at `start`.
    ///
    /// # Errors
    ///
    /// If the window is empty or does not fit in the sentence, an error variant will be
    /// returned.
    pub fn new(sentence: &'a Sentence, start: usize, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(FdaError::invalid_argument("len", "must be at least 1"));
        }
        if start + len > sentence.len() {
            return Err(FdaError::invalid_argument(
                "start",
                format!(
                    "window {}..{} exceeds sentence length {}",
                    start,
                    start + len,
                    sentence.len()
                ),
            ));
        }
        Ok(Self {
            sentence,
            start,
            len,
        })
    }

    /// Gets the tokens covered by this window.
    #[inline(always)]
    pub fn tokens(&self) -> &'a [Token] {
        &self.sentence.tokens[self.start..self.start + self.len]
    }

    /// Gets the start offset in the sentence.
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Gets the order (number of tokens) of the n-gram.
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.len
    }
}

impl PartialEq for Ngram<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.tokens() == other.tokens()
    }
}

impl Eq for Ngram<'_> {}

impl Hash for Ngram<'_> {
    // Must agree with the hash of `[Token]` so that views can look up owned keys.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens().hash(state);
    }
}

/// Iterator over the n-gram windows of a sentence. See [`Sentence::ngrams`].
pub struct NgramIter<'a> {
    sentence: &'a Sentence,
    max_order: usize,
    start: usize,
    len: usize,
}

impl<'a> Iterator for NgramIter<'a> {
    type Item = Ngram<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.sentence.len();
        while self.start < n {
            if self.len <= self.max_order && self.start + self.len <= n {
                let ngram = Ngram {
                    sentence: self.sentence,
                    start: self.start,
                    len: self.len,
                };
                self.len += 1;
                return Some(ngram);
            }
            self.start += 1;
            self.len = 1;
        }
        None
    }
}

/// Two index-aligned lists of sentences.
///
/// Sentence `i` of the source side is a translation of sentence `i` of the target side.
#[derive(Debug, Clone, Default)]
pub struct ParallelCorpus {
    source: Vec<Sentence>,
    target: Vec<Sentence>,
}

impl ParallelCorpus {
    /// Creates a new parallel corpus.
    ///
    /// # Errors
    ///
    /// [`FdaError::CorpusMismatch`] will be returned if the two sides have different lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// use fda::{ParallelCorpus, Sentence};
    ///
    /// let ok = ParallelCorpus::new(vec![Sentence::new(vec![1])], vec![Sentence::new(vec![2])]);
    /// assert!(ok.is_ok());
    ///
    /// let bad = ParallelCorpus::new(vec![Sentence::new(vec![1])], vec![]);
    /// assert!(bad.is_err());
    /// ```
    pub fn new(source: Vec<Sentence>, target: Vec<Sentence>) -> Result<Self> {
        if source.len() != target.len() {
            return Err(FdaError::corpus_mismatch(source.len(), target.len()));
        }
        Ok(Self { source, target })
    }

    /// Gets the number of sentence pairs.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Checks if the corpus has no sentence pairs.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Gets the source-side sentences.
    pub fn source(&self) -> &[Sentence] {
        &self.source
    }

    /// Gets the target-side sentences.
    pub fn target(&self) -> &[Sentence] {
        &self.target
    }

    /// Sum of source-side sentence lengths.
    pub fn n_source_tokens(&self) -> usize {
        self.source.iter().map(Sentence::len).sum()
    }
}
