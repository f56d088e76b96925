#![cfg_attr(docsrs, feature(doc_cfg))]

//! # FDA
//!
//! FDA selects, from a large pool of parallel training pairs, the subset that best covers the
//! n-grams of a test set. Sentences are chosen greedily: each pick maximizes the coverage of test
//! n-grams that are still useful, and the usefulness of an n-gram decays every time an emitted
//! sentence covers it again (Feature Decay Algorithm).
//!
//! Scores of queued sentences are not refreshed after each pick. Instead the queue keeps the
//! scores from when each sentence was last evaluated, which can only overstate the truth, and
//! the best candidate is re-evaluated before it is accepted.
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{prelude::*, BufReader};
//!
//! use fda::{Config, ParallelCorpus, Selector, Vocabulary};
//!
//! let mut vocab = Vocabulary::new();
//! let mut read = |path: &str| -> Vec<_> {
//!     BufReader::new(File::open(path).unwrap())
//!         .lines()
//!         .map(|line| vocab.sentence(&line.unwrap()).unwrap())
//!         .collect()
//! };
//! let test = ParallelCorpus::new(read("test.en"), read("test.de")).unwrap();
//! let train = ParallelCorpus::new(read("train.en"), read("train.de")).unwrap();
//!
//! let config = Config::new().output_words(Some(1_000_000));
//! for selection in Selector::new(&config, &test, &train).unwrap() {
//!     println!("{}\t{}", selection.index, selection.stats);
//! }
//! ```

mod utils;

mod config;
pub mod errors;
mod feature;
mod heap;
mod selector;
mod sentence;
mod vocabulary;

pub mod scorer;

pub use config::{Config, Decay};
pub use errors::{FdaError, Result};
pub use feature::{Feature, FeatureTable};
pub use heap::{HeapEntry, SentenceHeap};
pub use selector::{
    next_best, Candidate, Selection, SelectionStats, Selector, SelectorState, Summary,
};
pub use sentence::{Ngram, NgramIter, ParallelCorpus, Sentence, Token};
pub use vocabulary::Vocabulary;
