use std::fs::File;
use std::io::{prelude::*, stdout, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{ArgAction, Parser};
use fda::{Config, ParallelCorpus, Selector, Sentence, Vocabulary};

#[derive(Parser, Debug)]
#[command(
    about = "A program to select parallel training data covering the n-grams of a test set."
)]
struct Args {
    /// Source side of the test corpus, one tokenized sentence per line
    #[arg(long)]
    test_source: PathBuf,

    /// Target side of the test corpus
    #[arg(long)]
    test_target: PathBuf,

    /// Source side of the training corpus to select from
    #[arg(long)]
    train_source: PathBuf,

    /// Target side of the training corpus
    #[arg(long)]
    train_target: PathBuf,

    /// The maximum n-gram length
    #[arg(long, default_value = "3")]
    order: usize,

    /// Stop once this many source words have been written (0 means no limit)
    #[arg(long, default_value = "100000")]
    words: usize,

    /// The exponent of the inverse training frequency term (0 disables it)
    #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
    idf_exponent: f64,

    /// The exponent of the n-gram length term (0 disables it)
    #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
    length_exponent: f64,

    /// The feature decay factor: >= 1 divides by (1 + count), (0, 1) multiplies by factor^count,
    /// <= 0 disables decay
    #[arg(long, default_value = "0.5", allow_negative_numbers = true)]
    decay: f64,

    /// The exponent of the sentence length normalizer (0 disables it)
    #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
    sentence_length_exponent: f64,

    /// Print more diagnostics to stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        Config::new()
            .ngram_order(self.order)
            .output_words(Some(self.words).filter(|&w| w != 0))
            .idf_exponent(self.idf_exponent)
            .ngram_length_exponent(self.length_exponent)
            .decay_factor(self.decay)
            .sentence_length_exponent(self.sentence_length_exponent)
    }

    const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn open_corpus(path: &Path) -> Result<Box<dyn BufRead>, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    if path.extension().map_or(false, |ext| ext == "zst") {
        Ok(Box::new(BufReader::new(zstd::Decoder::new(f)?)))
    } else {
        Ok(Box::new(BufReader::new(f)))
    }
}

fn read_corpus(
    path: &Path,
    vocab: &mut Vocabulary,
) -> Result<Vec<Sentence>, Box<dyn std::error::Error>> {
    log::debug!("Loading {path:?} ...");
    let mut sents = vec![];
    for (i, line) in open_corpus(path)?.lines().enumerate() {
        if i % 100000 == 0 {
            log::debug!("# of sentences: {i}");
        }
        sents.push(vocab.sentence(&line?)?);
    }
    log::debug!("# of sentences: {}", sents.len());
    Ok(sents)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    let config = args.config();
    config.validate()?;

    let mut vocab = Vocabulary::new();
    let train = ParallelCorpus::new(
        read_corpus(&args.train_source, &mut vocab)?,
        read_corpus(&args.train_target, &mut vocab)?,
    )
    .map_err(|e| format!("training corpus: {e}"))?;
    let test = ParallelCorpus::new(
        read_corpus(&args.test_source, &mut vocab)?,
        read_corpus(&args.test_target, &mut vocab)?,
    )
    .map_err(|e| format!("test corpus: {e}"))?;
    log::debug!("# of distinct words: {}", vocab.len());

    log::debug!("Initializing features...");
    let start = Instant::now();
    let mut selector = Selector::new(&config, &test, &train)?;
    log::debug!(
        "# of features: {} (source), {} (target)",
        selector.source_features().len(),
        selector.target_features().len(),
    );

    log::debug!("Writing...");
    let mut out = BufWriter::new(stdout().lock());
    for selection in &mut selector {
        writeln!(
            out,
            "{}\t{}\t{}",
            vocab.render(selection.source),
            vocab.render(selection.target),
            selection.stats,
        )?;
    }
    out.flush()?;

    let summary = selector.summary();
    log::debug!(
        "Selected {} of {} pairs in {} [sec]",
        summary.n_selected,
        train.len(),
        start.elapsed().as_secs_f64()
    );
    log::info!(
        "--test-source {:?} --test-target {:?} {} {:?} {:?}\t{}\t{}\t{}\t{}\t{}\t{}",
        args.test_source,
        args.test_target,
        summary.config,
        args.train_source,
        args.train_target,
        summary.n_source_words,
        summary.n_target_words,
        summary.n_source_bigrams,
        summary.n_target_bigrams,
        summary.n_source_bigram_matches,
        summary.n_target_bigram_matches,
    );

    Ok(())
}
