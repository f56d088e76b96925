//! Definition of errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = FdaError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum FdaError {
    InvalidArgument(InvalidArgumentError),
    CorpusMismatch(CorpusMismatchError),
    EmptyQueue(EmptyQueueError),
    IOError(std::io::Error),
}

impl FdaError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) const fn corpus_mismatch(n_source: usize, n_target: usize) -> Self {
        Self::CorpusMismatch(CorpusMismatchError { n_source, n_target })
    }

    pub(crate) const fn empty_queue() -> Self {
        Self::EmptyQueue(EmptyQueueError)
    }
}

impl fmt::Display for FdaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument(e) => e.fmt(f),
            Self::CorpusMismatch(e) => e.fmt(f),
            Self::EmptyQueue(e) => e.fmt(f),
            Self::IOError(e) => e.fmt(f),
        }
    }
}

impl Error for FdaError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when the two sides of a parallel corpus have different lengths.
#[derive(Debug)]
pub struct CorpusMismatchError {
    /// Number of source-side sentences.
    pub(crate) n_source: usize,

    /// Number of target-side sentences.
    pub(crate) n_target: usize,
}

impl fmt::Display for CorpusMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CorpusMismatchError: source side has {} sentences but target side has {}",
            self.n_source, self.n_target
        )
    }
}

impl Error for CorpusMismatchError {}

/// Error used when the next candidate is requested from an exhausted queue.
#[derive(Debug)]
pub struct EmptyQueueError;

impl fmt::Display for EmptyQueueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EmptyQueueError: no candidate sentence is left")
    }
}

impl Error for EmptyQueueError {}

impl From<std::io::Error> for FdaError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}
