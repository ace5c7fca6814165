// src/traits.rs
use crate::core::{ColumnValues, LabelMap, Result};

/// Output of a user-supplied column encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedColumn {
    /// One code per source row. Codes must be dense non-negative integers
    /// that fit the 8-bit encoded matrix.
    pub codes: Vec<usize>,
    /// Labels for the codes. `None` means identity labels over the observed codes.
    pub labels: Option<LabelMap>,
}

/// Custom discretization for one column.
///
/// Implemented for any `Fn(&ColumnValues, &str) -> Result<EncodedColumn>`, so
/// a closure can be used directly as a rule.
pub trait ColumnEncoder: Send + Sync {
    /// Encodes `values`, the source column called `column`.
    fn encode(&self, values: &ColumnValues, column: &str) -> Result<EncodedColumn>;
}

impl<F> ColumnEncoder for F
where
    F: Fn(&ColumnValues, &str) -> Result<EncodedColumn> + Send + Sync,
{
    fn encode(&self, values: &ColumnValues, column: &str) -> Result<EncodedColumn> {
        self(values, column)
    }
}
