use core::fmt;

use crate::config::Config;
use crate::errors::{FdaError, Result};
use crate::feature::FeatureTable;
use crate::heap::SentenceHeap;
use crate::scorer;
use crate::sentence::{ParallelCorpus, Sentence};

/// Sentence accepted by [`next_best`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index in the training corpus.
    pub index: usize,

    /// Score of the sentence against the current feature table.
    pub score: f32,

    /// Number of entries popped before one was accepted.
    pub n_iterations: usize,
}

/// Pops candidates until one provably beats every other entry of `heap`.
///
/// An entry's queued score never understates its current score, so a popped sentence whose
/// recomputed score is at least the queued score of the new top cannot be beaten. Otherwise the
/// sentence is pushed back with its recomputed score and the next top is tried.
///
/// Scores are compared in single precision, and a recomputed score within one `f32::EPSILON`
/// (relative) below the top is accepted.
///
/// # Errors
///
/// [`FdaError::EmptyQueue`] will be returned if `heap` is empty.
pub fn next_best(
    heap: &mut SentenceHeap,
    sentences: &[Sentence],
    table: &FeatureTable,
    config: &Config,
) -> Result<Candidate> {
    let mut n_iterations = 0;
    loop {
        let entry = heap.pop().ok_or_else(FdaError::empty_queue)?;
        n_iterations += 1;
        let score = scorer::sentence_score(&sentences[entry.index], table, config) as f32;
        let top_score = match heap.peek() {
            Some(top) => top.score,
            None => {
                return Ok(Candidate {
                    index: entry.index,
                    score,
                    n_iterations,
                })
            }
        };
        if score >= top_score * (1.0 - f32::EPSILON) {
            return Ok(Candidate {
                index: entry.index,
                score,
                n_iterations,
            });
        }
        log::trace!(
            "sentence {} dropped from {} to {}, below top {}",
            entry.index,
            entry.score,
            score,
            top_score
        );
        heap.push(entry.index, score);
    }
}

/// Whether the selection loop can emit more sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Running,
    Done,
}

/// Diagnostics attached to an emitted sentence pair.
///
/// Word and match counts are cumulative over the run so far, including this pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStats {
    pub score: f32,
    pub n_iterations: usize,
    pub n_source_words: usize,
    pub n_target_words: usize,
    pub n_source_bigrams: usize,
    pub n_target_bigrams: usize,
    pub n_source_bigram_matches: usize,
    pub n_target_bigram_matches: usize,
}

impl fmt::Display for SelectionStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.score,
            self.n_iterations,
            self.n_source_words,
            self.n_target_words,
            self.n_source_bigrams,
            self.n_target_bigrams,
            self.n_source_bigram_matches,
            self.n_target_bigram_matches,
        )
    }
}

/// An emitted training pair.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    /// Index in the training corpus.
    pub index: usize,
    pub source: &'a Sentence,
    pub target: &'a Sentence,
    pub stats: SelectionStats,
}

/// Final record of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub config: Config,
    pub n_selected: usize,
    pub n_source_words: usize,
    pub n_target_words: usize,
    pub n_source_bigrams: usize,
    pub n_target_bigrams: usize,
    pub n_source_bigram_matches: usize,
    pub n_target_bigram_matches: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.config,
            self.n_source_words,
            self.n_target_words,
            self.n_source_bigrams,
            self.n_target_bigrams,
            self.n_source_bigram_matches,
            self.n_target_bigram_matches,
        )
    }
}

#[derive(Debug, Default)]
struct Counters {
    n_selected: usize,
    n_source_words: usize,
    n_target_words: usize,
    n_source_bigram_matches: usize,
    n_target_bigram_matches: usize,
}

/// Lazy-greedy selection of training pairs covering the n-grams of a test set.
///
/// # Examples
///
/// ```
/// use fda::{Config, ParallelCorpus, Selector, Vocabulary};
///
/// let mut vocab = Vocabulary::new();
/// let mut corpus = |lines: &[&str]| -> Vec<_> {
///     lines.iter().map(|l| vocab.sentence(l).unwrap()).collect()
/// };
/// let test = ParallelCorpus::new(corpus(&["a b c"]), corpus(&["x y z"])).unwrap();
/// let train = ParallelCorpus::new(
///     corpus(&["d e", "a b c", "a d"]),
///     corpus(&["u v", "x y z", "x u"]),
/// ).unwrap();
///
/// let config = Config::new().ngram_order(2);
/// let selector = Selector::new(&config, &test, &train).unwrap();
/// let order: Vec<usize> = selector.map(|s| s.index).collect();
/// assert_eq!(vec![1, 2, 0], order);
/// ```
pub struct Selector<'a> {
    config: &'a Config,
    train: &'a ParallelCorpus,
    source_features: FeatureTable,
    target_features: FeatureTable,
    heap: SentenceHeap,
    state: SelectorState,
    counters: Counters,
}

impl<'a> Selector<'a> {
    /// Builds the feature tables from `test` and queues every sentence of `train`.
    ///
    /// Only the source side drives selection. Target-side features are tracked for the bigram
    /// statistics and are never scored.
    ///
    /// # Errors
    ///
    /// [`FdaError::InvalidArgument`] will be returned if `config` does not validate.
    pub fn new(
        config: &'a Config,
        test: &ParallelCorpus,
        train: &'a ParallelCorpus,
    ) -> Result<Self> {
        config.validate()?;

        let mut source_features = FeatureTable::extract(test.source(), config.ngram_order);
        let target_features = FeatureTable::extract(test.target(), config.ngram_order);

        let n_train_tokens = if config.idf_exponent == 0.0 {
            0
        } else {
            source_features.accumulate_train_counts(train.source(), config.ngram_order)
        };
        source_features.init_scores(config, n_train_tokens);

        let heap = SentenceHeap::from_scores(train.source().iter().enumerate().map(|(i, s)| {
            (
                i,
                scorer::sentence_score(s, &source_features, config) as f32,
            )
        }));
        log::debug!("queued {} training sentences", heap.len());

        Ok(Self {
            config,
            train,
            source_features,
            target_features,
            heap,
            state: SelectorState::Running,
            counters: Counters::default(),
        })
    }

    /// Finds the best remaining training sentence without emitting it.
    ///
    /// The sentence is removed from the queue; callers normally use [`Selector::select_next`]
    /// instead.
    ///
    /// # Errors
    ///
    /// [`FdaError::EmptyQueue`] will be returned if no sentence is left.
    pub fn next_best(&mut self) -> Result<Candidate> {
        next_best(
            &mut self.heap,
            self.train.source(),
            &self.source_features,
            self.config,
        )
    }

    /// Emits the next training pair and decays the features it covers.
    ///
    /// # Returns
    ///
    /// `None` once the queue is exhausted or the output budget has been reached. The budget is
    /// checked after each emission, so the last pair may overshoot it.
    pub fn select_next(&mut self) -> Option<Selection<'a>> {
        if self.state == SelectorState::Done {
            return None;
        }
        if self.heap.is_empty() {
            self.state = SelectorState::Done;
            return None;
        }
        let candidate = self.next_best().ok()?;
        let train = self.train;
        let source = &train.source()[candidate.index];
        let target = &train.target()[candidate.index];

        let counters = &mut self.counters;
        counters.n_selected += 1;
        counters.n_source_words += source.len();
        counters.n_target_words += target.len();
        counters.n_source_bigram_matches += self
            .source_features
            .update_after_emission(source, self.config);
        counters.n_target_bigram_matches += self
            .target_features
            .update_after_emission(target, self.config);

        if let Some(limit) = self.config.output_words {
            if counters.n_source_words >= limit {
                log::debug!(
                    "output budget reached: {} >= {}",
                    counters.n_source_words,
                    limit
                );
                self.state = SelectorState::Done;
            }
        }

        Some(Selection {
            index: candidate.index,
            source,
            target,
            stats: SelectionStats {
                score: candidate.score,
                n_iterations: candidate.n_iterations,
                n_source_words: counters.n_source_words,
                n_target_words: counters.n_target_words,
                n_source_bigrams: self.source_features.n_bigrams(),
                n_target_bigrams: self.target_features.n_bigrams(),
                n_source_bigram_matches: counters.n_source_bigram_matches,
                n_target_bigram_matches: counters.n_target_bigram_matches,
            },
        })
    }

    pub const fn state(&self) -> SelectorState {
        self.state
    }

    /// Gets the number of training sentences not yet emitted.
    pub fn n_remaining(&self) -> usize {
        self.heap.len()
    }

    pub const fn source_features(&self) -> &FeatureTable {
        &self.source_features
    }

    pub const fn target_features(&self) -> &FeatureTable {
        &self.target_features
    }

    /// Gets the configuration and the counters accumulated so far.
    pub fn summary(&self) -> Summary {
        Summary {
            config: self.config.clone(),
            n_selected: self.counters.n_selected,
            n_source_words: self.counters.n_source_words,
            n_target_words: self.counters.n_target_words,
            n_source_bigrams: self.source_features.n_bigrams(),
            n_target_bigrams: self.target_features.n_bigrams(),
            n_source_bigram_matches: self.counters.n_source_bigram_matches,
            n_target_bigram_matches: self.counters.n_target_bigram_matches,
        }
    }
}

impl<'a> Iterator for Selector<'a> {
    type Item = Selection<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.select_next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::sentence::Token;

    fn corpus(raw: &[&[Token]]) -> Vec<Sentence> {
        raw.iter().map(|&tokens| Sentence::new(tokens)).collect()
    }

    fn parallel(source: &[&[Token]], target: &[&[Token]]) -> ParallelCorpus {
        ParallelCorpus::new(corpus(source), corpus(target)).unwrap()
    }

    fn assert_close(expected: f64, actual: f32) {
        assert!(
            (expected - f64::from(actual)).abs() < 1e-5,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    // a b c = 0 1 2, d = 3
    fn scenario() -> (ParallelCorpus, ParallelCorpus, Config) {
        let test = parallel(&[&[0, 1, 2], &[0, 1, 3]], &[&[10, 11, 12], &[10, 13]]);
        let train = parallel(&[&[0, 1, 2][..]; 5], &[&[10, 11, 12][..]; 5]);
        let config = Config::new()
            .ngram_order(2)
            .output_words(Some(100))
            .idf_exponent(1.0)
            .ngram_length_exponent(0.0)
            .decay_factor(0.5)
            .sentence_length_exponent(0.0);
        (test, train, config)
    }

    #[test]
    fn test_scenario_feature_table() {
        let (test, train, config) = scenario();
        let selector = Selector::new(&config, &test, &train).unwrap();
        let table = selector.source_features();

        assert_eq!(7, table.len());
        assert_eq!(3, table.n_bigrams());
        for key in [&[0][..], &[1], &[2], &[3], &[0, 1], &[1, 2], &[1, 3]] {
            assert!(table.get(key).is_some());
        }
        assert_eq!(5, table.get(&[0, 1]).unwrap().train_count());
        assert_eq!(0, table.get(&[1, 3]).unwrap().train_count());
        assert_eq!(
            -(5.0f64 / 15.0).ln(),
            table.get(&[0, 1]).unwrap().static_score()
        );
        assert_eq!(
            -(1.0f64 / 15.0).ln(),
            table.get(&[3]).unwrap().static_score()
        );
        assert_eq!(3, selector.target_features().n_bigrams());
    }

    #[test]
    fn test_scenario_first_emission_decays() {
        let (test, train, config) = scenario();
        let mut selector = Selector::new(&config, &test, &train).unwrap();

        let first = selector.select_next().unwrap();
        assert_eq!(0, first.index);
        assert_eq!(1, first.stats.n_iterations);
        assert_close(5.0 * 3f64.ln(), first.stats.score);
        assert_eq!(3, first.stats.n_source_words);
        assert_eq!(3, first.stats.n_target_words);
        assert_eq!(2, first.stats.n_source_bigram_matches);
        assert_eq!(2, first.stats.n_target_bigram_matches);

        let ab = selector.source_features().get(&[0, 1]).unwrap();
        assert_eq!(1, ab.output_count());
        assert_eq!(ab.static_score() / 2.0, ab.current_score());
        let bd = selector.source_features().get(&[1, 3]).unwrap();
        assert_eq!(0, bd.output_count());
        assert_eq!(bd.static_score(), bd.current_score());
    }

    #[test]
    fn test_scenario_reconciliation_order() {
        let (test, train, config) = scenario();
        let selector = Selector::new(&config, &test, &train).unwrap();
        let selections: Vec<_> = selector.collect();

        let indices: Vec<usize> = selections.iter().map(|s| s.index).collect();
        let n_iterations: Vec<usize> = selections.iter().map(|s| s.stats.n_iterations).collect();
        assert_eq!(vec![0, 4, 3, 2, 1], indices);
        assert_eq!(vec![1, 4, 3, 2, 1], n_iterations);

        // The second pick is scored against the halved features, not its queued score.
        assert_close(5.0 * 3f64.ln() / 2.0, selections[1].stats.score);
        assert_close(5.0 * 3f64.ln() / 16.0, selections[4].stats.score);

        let last = selections[4].stats;
        assert_eq!(15, last.n_source_words);
        assert_eq!(2, last.n_source_bigram_matches);
    }

    #[test]
    fn test_scenario_summary() {
        let (test, train, config) = scenario();
        let mut selector = Selector::new(&config, &test, &train).unwrap();
        while selector.select_next().is_some() {}

        assert_eq!(SelectorState::Done, selector.state());
        let summary = selector.summary();
        assert_eq!(5, summary.n_selected);
        assert_eq!(
            "--decay 0.5 --idf-exponent 1 --length-exponent 0 --order 2 \
             --sentence-length-exponent 0 --words 100\t15\t15\t3\t3\t2\t2",
            summary.to_string()
        );
    }

    #[test]
    fn test_degenerate_config_counts_windows() {
        let test = parallel(&[&[0, 1, 2]], &[&[]]);
        let train = parallel(
            &[&[0, 1, 2], &[0, 1], &[2, 5], &[], &[0, 1, 2]],
            &[&[], &[], &[], &[], &[]],
        );
        let config = Config::new()
            .ngram_order(2)
            .output_words(None)
            .idf_exponent(0.0)
            .ngram_length_exponent(0.0)
            .decay_factor(0.0)
            .sentence_length_exponent(0.0);

        let run = || -> Vec<(usize, f32, usize)> {
            Selector::new(&config, &test, &train)
                .unwrap()
                .map(|s| (s.index, s.stats.score, s.stats.n_iterations))
                .collect()
        };
        let expected = vec![
            (0, 5.0, 1),
            (4, 5.0, 1),
            (1, 3.0, 1),
            (2, 1.0, 1),
            (3, 0.0, 1),
        ];
        assert_eq!(expected, run());
        assert_eq!(expected, run());

        let selector = Selector::new(&config, &test, &train).unwrap();
        for (_, f) in selector.source_features().iter() {
            assert_eq!(1.0, f.static_score());
        }
    }

    #[test]
    fn test_idf_disabled_skips_train_counts() {
        let test = parallel(&[&[0, 1]], &[&[0]]);
        let train = parallel(&[&[0, 1], &[0]], &[&[0], &[0]]);
        let config = Config::new().idf_exponent(0.0);
        let selector = Selector::new(&config, &test, &train).unwrap();

        for (_, f) in selector.source_features().iter() {
            assert_eq!(0, f.train_count());
        }
    }

    #[test]
    fn test_target_side_does_not_drive_selection() {
        let test = parallel(&[&[0]], &[&[7, 8]]);
        let train = parallel(&[&[1], &[0]], &[&[7, 8], &[9]]);
        let config = Config::new().ngram_order(2);
        let mut selector = Selector::new(&config, &test, &train).unwrap();

        let first = selector.select_next().unwrap();
        assert_eq!(1, first.index);
        assert_eq!(0, first.stats.n_target_bigram_matches);
        let second = selector.select_next().unwrap();
        assert_eq!(1, second.stats.n_target_bigram_matches);
        assert_eq!(0.0, selector.target_features().get(&[7, 8]).unwrap().current_score());
    }

    #[test]
    fn test_budget_checked_after_emission() {
        let source: Vec<Vec<Token>> = (0..10).map(|i| vec![3 * i, 3 * i + 1, 3 * i + 2]).collect();
        let source_refs: Vec<&[Token]> = source.iter().map(Vec::as_slice).collect();
        let target_refs: Vec<&[Token]> = vec![&[]; 10];
        let test = parallel(&source_refs, &target_refs);
        let train = parallel(&source_refs, &target_refs);
        let config = Config::new().output_words(Some(7));
        let mut selector = Selector::new(&config, &test, &train).unwrap();

        let mut n_words = 0;
        let mut n_selected = 0;
        while let Some(s) = selector.select_next() {
            n_words = s.stats.n_source_words;
            n_selected += 1;
        }
        assert_eq!(3, n_selected);
        assert_eq!(9, n_words);
        assert!(n_words < 7 + 3);
        assert_eq!(SelectorState::Done, selector.state());
        assert_eq!(7, selector.n_remaining());
        assert!(selector.select_next().is_none());
    }

    #[test]
    fn test_budget_zero_emits_one_sentence() {
        let test = parallel(&[&[0]], &[&[0]]);
        let train = parallel(&[&[0], &[0]], &[&[0], &[0]]);
        let config = Config::new().output_words(Some(0));
        let selector = Selector::new(&config, &test, &train).unwrap();

        assert_eq!(1, selector.count());
    }

    #[test]
    fn test_next_best_empty_queue() {
        let test = parallel(&[&[0]], &[&[0]]);
        let train = parallel(&[], &[]);
        let config = Config::new();
        let mut selector = Selector::new(&config, &test, &train).unwrap();

        let result = selector.next_best();
        assert!(result.is_err());
        assert_eq!(
            "EmptyQueueError: no candidate sentence is left",
            &result.err().unwrap().to_string()
        );
        assert!(selector.select_next().is_none());
        assert_eq!(SelectorState::Done, selector.state());
    }

    #[test]
    fn test_new_invalid_config() {
        let test = parallel(&[&[0]], &[&[0]]);
        let train = parallel(&[&[0]], &[&[0]]);
        let config = Config::new().ngram_order(0);

        assert!(Selector::new(&config, &test, &train).is_err());
    }

    #[test]
    fn test_negative_idf_exponent_terminates() {
        // Every training token is the feature, so its idf is -0.0.
        let test = parallel(&[&[0]], &[&[0]]);
        let train = parallel(&[&[0][..]; 3], &[&[0][..]; 3]);
        let config = Config::new()
            .ngram_order(1)
            .output_words(None)
            .idf_exponent(-1.0)
            .ngram_length_exponent(0.0)
            .decay_factor(1e-300);

        let selector = Selector::new(&config, &test, &train).unwrap();
        assert_eq!(0.0, selector.source_features().get(&[0]).unwrap().static_score());
        let selected: Vec<_> = selector.map(|s| s.index).collect();
        assert_eq!(vec![0, 1, 2], selected);
    }

    #[test]
    fn test_next_best_reinserts_stale_entry() {
        let sentences = corpus(&[&[0], &[1]]);
        let config = Config::new()
            .ngram_order(1)
            .idf_exponent(0.0)
            .ngram_length_exponent(0.0)
            .sentence_length_exponent(0.0);
        let mut table = FeatureTable::extract(&sentences, 1);
        table.init_scores(&config, 0);
        // Sentence 0 was queued with an inflated score.
        let mut heap = SentenceHeap::from_scores([(0, 9.0), (1, 2.0)]);

        let candidate = next_best(&mut heap, &sentences, &table, &config).unwrap();
        assert_eq!(
            Candidate {
                index: 1,
                score: 1.0,
                n_iterations: 2,
            },
            candidate
        );
        assert_eq!(1, heap.len());
        assert_eq!(0, heap.peek().unwrap().index);
        assert_eq!(1.0, heap.peek().unwrap().score);
    }

    #[test]
    fn test_next_best_accepts_within_epsilon() {
        let sentences = corpus(&[&[0]]);
        let config = Config::new()
            .ngram_order(1)
            .idf_exponent(0.0)
            .ngram_length_exponent(0.0)
            .sentence_length_exponent(0.0);
        let mut table = FeatureTable::extract(&sentences, 1);
        table.init_scores(&config, 0);
        let just_above = 1.0 + f32::EPSILON;
        let mut heap = SentenceHeap::from_scores([(0, 1.5), (5, just_above)]);

        let candidate = next_best(&mut heap, &sentences, &table, &config).unwrap();
        assert_eq!(0, candidate.index);
        assert_eq!(1, candidate.n_iterations);
    }

    #[test]
    fn test_heap_top_bounds_true_scores() {
        #[rustfmt::skip]
        let source: &[&[Token]] = &[
            &[0, 1, 2, 3], &[1, 2], &[4, 0, 1], &[5, 5, 5], &[2, 3, 4, 0],
            &[1], &[0, 4, 2, 1, 3], &[6, 7], &[3, 2, 1, 0], &[], &[0, 1, 2],
        ];
        let target: Vec<&[Token]> = vec![&[]; source.len()];
        let test = parallel(&[&[0, 1, 2, 3, 4], &[2, 3, 0, 1], &[5, 1]], &[&[], &[], &[]]);
        let train = parallel(source, &target);

        for decay in [0.5, 1.0, 0.9] {
            let config = Config::new().decay_factor(decay).output_words(None);
            let mut selector = Selector::new(&config, &test, &train).unwrap();
            loop {
                let true_score = |index: usize| {
                    scorer::sentence_score(
                        &train.source()[index],
                        selector.source_features(),
                        &config,
                    ) as f32
                };
                let best = selector.heap.iter().map(|e| true_score(e.index)).fold(0.0, f32::max);
                if let Some(top) = selector.heap.peek() {
                    for e in selector.heap.iter() {
                        assert!(e.score >= true_score(e.index));
                        assert!(top.score >= true_score(e.index));
                    }
                }
                match selector.select_next() {
                    Some(s) => assert!(s.stats.score >= best * (1.0 - f32::EPSILON)),
                    None => break,
                }
            }
            assert_eq!(0, selector.n_remaining());
        }
    }
}
