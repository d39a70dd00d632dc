//! Error type shared by the input, configuration and pipeline layers.
//!
//! The numerical core never fails: solver trouble and degenerate tests are
//! logged and folded into the verdict. Only contract violations on the way in
//! (bad input, bad configuration, unreadable files) surface as errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CausalError {
    #[error("no series supplied for causal discovery")]
    EmptyInput,

    #[error("series '{series}' has {actual} samples, expected {expected}")]
    LengthMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "series '{series}': occurrence [{begin}, {end}] is outside a window of length {length}"
    )]
    OccurrenceOutOfRange {
        series: String,
        begin: usize,
        end: usize,
        length: usize,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CausalError>;
