//! Error taxonomy for dataset shift detection
//!
//! Two kinds of failure reach the caller:
//! - [`ValidationError`]: malformed, insufficient or mismatched input
//! - [`NumericError`]: feature data the classifier cannot consume
//!
//! Both are wrapped by [`ShiftError`] so detector functions return a single
//! error type while tests can still assert on the kind.

use std::fmt;
use thiserror::Error;

/// Which of the two compared datasets an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Dataset A, labeled 0 in the pool
    Reference,
    /// Dataset B, labeled 1 in the pool
    Current,
}

impl Side {
    /// Origin label used when training the discriminator
    pub fn label(self) -> u8 {
        match self {
            Side::Reference => 0,
            Side::Current => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Reference => write!(f, "reference"),
            Side::Current => write!(f, "current"),
        }
    }
}

/// Malformed, insufficient or mismatched input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{side} dataset is empty")]
    EmptyDataset { side: Side },

    #[error("{side} dataset has {actual} rows, need at least {required}")]
    TooFewRows {
        side: Side,
        required: usize,
        actual: usize,
    },

    #[error(
        "column sets differ: missing from reference [{}], missing from current [{}]",
        .missing_in_reference.join(", "),
        .missing_in_current.join(", ")
    )]
    ColumnMismatch {
        missing_in_reference: Vec<String>,
        missing_in_current: Vec<String>,
    },

    #[error("dataset has no feature columns")]
    NoFeatures,

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("row {row} has {actual} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{split} split would hold no {side} rows ({available} available)")]
    EmptySplit {
        split: &'static str,
        side: Side,
        available: usize,
    },

    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

/// Feature values the classifier cannot consume
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("{side} dataset row {row} column {column:?} is not finite ({value})")]
    NonFinite {
        side: Side,
        row: usize,
        column: String,
        value: f64,
    },

    #[error("row {row} column {column:?} is not numeric: {value:?}")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },
}

/// Error returned by the shift detector
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShiftError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("numeric error: {0}")]
    Numeric(#[from] NumericError),
}

impl ShiftError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ShiftError::Validation(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ShiftError::Numeric(_))
    }
}

pub type Result<T> = std::result::Result<T, ShiftError>;
