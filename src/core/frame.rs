// src/core/frame.rs
use crate::core::errors::{DiscretizeError, Result};
use indexmap::IndexMap;

/// Values of one source column, one entry per row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Numeric values. `NaN` marks a missing value.
    Float(Vec<f64>),
    /// Integer values, never missing.
    Int(Vec<i64>),
    /// String values. `None` marks a missing value.
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ColumnValues::Float(_) => "float",
            ColumnValues::Int(_) => "integer",
            ColumnValues::Text(_) => "text",
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnValues::Float(v) => v[row].is_nan(),
            ColumnValues::Int(_) => false,
            ColumnValues::Text(v) => v[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_missing(row)).count()
    }

    /// String form of a non-missing value, used for categorical encoding.
    pub fn stringify(&self, row: usize) -> Option<String> {
        match self {
            ColumnValues::Float(v) if v[row].is_nan() => None,
            ColumnValues::Float(v) => Some(format!("{:?}", v[row])),
            ColumnValues::Int(v) => Some(v[row].to_string()),
            ColumnValues::Text(v) => v[row].clone(),
        }
    }

    /// Numeric view of the column; missing entries are `NaN`.
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        match self {
            ColumnValues::Float(v) => Some(v.clone()),
            ColumnValues::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ColumnValues::Text(_) => None,
        }
    }
}

impl From<Vec<f64>> for ColumnValues {
    fn from(v: Vec<f64>) -> Self {
        ColumnValues::Float(v)
    }
}

impl From<Vec<i64>> for ColumnValues {
    fn from(v: Vec<i64>) -> Self {
        ColumnValues::Int(v)
    }
}

impl From<Vec<&str>> for ColumnValues {
    fn from(v: Vec<&str>) -> Self {
        ColumnValues::Text(v.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

impl From<Vec<Option<String>>> for ColumnValues {
    fn from(v: Vec<Option<String>>) -> Self {
        ColumnValues::Text(v)
    }
}

/// A row-aligned table of named columns, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: IndexMap<String, ColumnValues>,
    n_rows: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column. All columns must have the same number of rows.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: impl Into<ColumnValues>,
    ) -> Result<Self> {
        let name = name.into();
        let values = values.into();
        if !self.columns.is_empty() && values.len() != self.n_rows {
            return Err(DiscretizeError::RowCountMismatch {
                column: name,
                expected: self.n_rows,
                got: values.len(),
            });
        }
        self.n_rows = values.len();
        self.columns.insert(name, values);
        Ok(self)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnValues> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }
}
