// src/core/errors.rs
use crate::core::data::{Code, ColumnKey};

#[derive(Debug, thiserror::Error)]
pub enum DiscretizeError {
    /// Wraps any failure raised while evaluating one column's rule.
    #[error("error discretizing column '{column}': {source}")]
    Column {
        column: String,
        #[source]
        source: Box<DiscretizeError>,
    },

    #[error("one of 'bins' or 'quantiles' must be passed for binning discretization")]
    MissingCutoffs,

    #[error("length of names must be 1 + num bins ({expected}), got {got}")]
    NameCountMismatch { expected: usize, got: usize },

    #[error("bin cutoffs must be non-decreasing: {cutoffs:?}")]
    NonMonotonicCutoffs { cutoffs: Vec<f64> },

    #[error("quantile {0} is outside [0, 1]")]
    InvalidQuantile(f64),

    #[error("cannot compute quantiles of a column with no non-missing values")]
    EmptyColumn,

    #[error("{count} missing value(s) found and no nan_name was given")]
    MissingValues { count: usize },

    #[error("value {value} cannot be kept as-is: expected an integer in 0..=255")]
    InvalidKeepValue { value: String },

    #[error("method '{method}' does not support {kind} columns")]
    UnsupportedColumnType { method: &'static str, kind: &'static str },

    #[error("code {code} does not fit the 8-bit encoded matrix (max {max})")]
    CodeOverflow { code: usize, max: usize },

    #[error("column '{0}' not found in source")]
    UnknownColumn(String),

    #[error("column '{column}' has {got} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("mask has {got} entries but the data has {expected} rows")]
    MaskLengthMismatch { expected: usize, got: usize },

    #[error("{code} not in value map for {column} ({key}): {labels}")]
    UnknownCode {
        key: ColumnKey,
        column: String,
        code: Code,
        labels: String,
    },

    #[error("row {row} out of range for {n_rows} rows")]
    RowOutOfRange { row: usize, n_rows: usize },

    #[error("no column with encoded key {0}")]
    UnknownColumnKey(ColumnKey),

    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("{label} not in value map for feature '{feature}': {labels}")]
    UnknownLabel {
        feature: String,
        label: String,
        labels: String,
    },

    #[error("column encoder failed: {0}")]
    Encoder(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ndarray ShapeError: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl DiscretizeError {
    /// Attaches the column name to an error raised while discretizing it.
    pub fn in_column(self, column: impl Into<String>) -> Self {
        DiscretizeError::Column {
            column: column.into(),
            source: Box::new(self),
        }
    }
}

// Convenience type alias for Result
pub type Result<T> = std::result::Result<T, DiscretizeError>;
