// src/core/matrix.rs
//! Storage for the encoded matrix.
//!
//! Tabular data is stored densely as an `ndarray` matrix of codes. Token-set
//! data is mostly zeros, so it is stored in compressed sparse row (CSR) form.

use crate::core::data::Code;
use crate::core::errors::{DiscretizeError, Result};
use ndarray::{Array2, Axis};

/// Compressed Sparse Row matrix of codes.
///
/// # Structure
///
/// - `values`: Non-zero values, stored row by row
/// - `col_indices`: Column index for each value, ascending within a row
/// - `row_ptrs`: Starting index in values/col_indices for each row
///
/// For row `i`, the values are `values[row_ptrs[i]..row_ptrs[i+1]]`
/// with corresponding columns `col_indices[row_ptrs[i]..row_ptrs[i+1]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrMatrix {
    values: Vec<Code>,
    col_indices: Vec<u32>,
    /// Length is num_rows + 1, with row_ptrs[num_rows] = nnz.
    row_ptrs: Vec<usize>,
    num_cols: usize,
}

impl CsrMatrix {
    /// Builds a binary matrix from accumulated row pointers and column indices.
    ///
    /// Each row's indices are sorted and deduplicated; every stored entry is 1.
    ///
    /// Every column index must be below `num_cols`.
    pub fn from_binary_parts(
        row_ptrs: Vec<usize>,
        mut col_indices: Vec<u32>,
        num_cols: usize,
    ) -> Self {
        debug_assert!(
            col_indices.iter().all(|&col| (col as usize) < num_cols),
            "column index out of range for {num_cols} columns"
        );
        let mut compact_ptrs = Vec::with_capacity(row_ptrs.len());
        compact_ptrs.push(0);
        let mut write = 0;
        for bounds in row_ptrs.windows(2) {
            let row = &mut col_indices[bounds[0]..bounds[1]];
            row.sort_unstable();
            let mut last = None;
            for read in bounds[0]..bounds[1] {
                let col = col_indices[read];
                if last != Some(col) {
                    col_indices[write] = col;
                    write += 1;
                    last = Some(col);
                }
            }
            compact_ptrs.push(write);
        }
        col_indices.truncate(write);

        CsrMatrix {
            values: vec![1; col_indices.len()],
            col_indices,
            row_ptrs: compact_ptrs,
            num_cols,
        }
    }

    /// Builds a binary matrix from per-row column index lists.
    pub fn from_binary_rows(rows: &[Vec<u32>], num_cols: usize) -> Self {
        let mut row_ptrs = Vec::with_capacity(rows.len() + 1);
        row_ptrs.push(0);
        let mut col_indices = Vec::new();
        for row in rows {
            col_indices.extend_from_slice(row);
            row_ptrs.push(col_indices.len());
        }
        Self::from_binary_parts(row_ptrs, col_indices, num_cols)
    }

    pub fn num_rows(&self) -> usize {
        self.row_ptrs.len() - 1
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterates the stored `(column, value)` pairs of a row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, Code)> + '_ {
        let range = self.row_ptrs[row]..self.row_ptrs[row + 1];
        self.col_indices[range.clone()]
            .iter()
            .zip(&self.values[range])
            .map(|(&col, &val)| (col as usize, val))
    }

    /// Column indices stored for a row.
    pub fn row_indices(&self, row: usize) -> &[u32] {
        &self.col_indices[self.row_ptrs[row]..self.row_ptrs[row + 1]]
    }

    pub fn get(&self, row: usize, col: usize) -> Code {
        let start = self.row_ptrs[row];
        match self.row_indices(row).binary_search(&(col as u32)) {
            Ok(pos) => self.values[start + pos],
            Err(_) => 0,
        }
    }

    /// Mean of each column. An empty matrix has all-zero means.
    pub fn column_means(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.num_cols];
        for (&col, &val) in self.col_indices.iter().zip(&self.values) {
            sums[col as usize] += val as f64;
        }
        let n = self.num_rows();
        if n > 0 {
            for s in &mut sums {
                *s /= n as f64;
            }
        }
        sums
    }

    /// Returns a matrix whose column `j` is this matrix's column `columns[j]`.
    pub fn select_columns(&self, columns: &[usize]) -> CsrMatrix {
        let mut new_index = vec![None; self.num_cols];
        for (new_col, &old_col) in columns.iter().enumerate() {
            new_index[old_col] = Some(new_col as u32);
        }

        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = Vec::with_capacity(self.row_ptrs.len());
        row_ptrs.push(0);
        let mut row_entries: Vec<(u32, Code)> = Vec::new();
        for row in 0..self.num_rows() {
            row_entries.clear();
            row_entries.extend(
                self.row(row)
                    .filter_map(|(col, val)| new_index[col].map(|new_col| (new_col, val))),
            );
            row_entries.sort_unstable_by_key(|&(col, _)| col);
            for &(col, val) in &row_entries {
                col_indices.push(col);
                values.push(val);
            }
            row_ptrs.push(col_indices.len());
        }

        CsrMatrix {
            values,
            col_indices,
            row_ptrs,
            num_cols: columns.len(),
        }
    }

    /// Copies the rows whose mask entry is true, preserving row order.
    pub fn filter_rows(&self, mask: &[bool]) -> CsrMatrix {
        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = vec![0];
        for (row, _) in mask.iter().enumerate().filter(|&(_, &keep)| keep) {
            let range = self.row_ptrs[row]..self.row_ptrs[row + 1];
            values.extend_from_slice(&self.values[range.clone()]);
            col_indices.extend_from_slice(&self.col_indices[range]);
            row_ptrs.push(col_indices.len());
        }
        CsrMatrix {
            values,
            col_indices,
            row_ptrs,
            num_cols: self.num_cols,
        }
    }

    pub fn to_dense(&self) -> Array2<Code> {
        let mut dense = Array2::zeros((self.num_rows(), self.num_cols));
        for row in 0..self.num_rows() {
            for (col, val) in self.row(row) {
                dense[[row, col]] = val;
            }
        }
        dense
    }
}

/// The integer-coded matrix owned by a `DiscretizedData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedMatrix {
    Dense(Array2<Code>),
    Sparse(CsrMatrix),
}

impl EncodedMatrix {
    pub fn n_rows(&self) -> usize {
        match self {
            EncodedMatrix::Dense(m) => m.nrows(),
            EncodedMatrix::Sparse(m) => m.num_rows(),
        }
    }

    pub fn n_cols(&self) -> usize {
        match self {
            EncodedMatrix::Dense(m) => m.ncols(),
            EncodedMatrix::Sparse(m) => m.num_cols(),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Code {
        match self {
            EncodedMatrix::Dense(m) => m[[row, col]],
            EncodedMatrix::Sparse(m) => m.get(row, col),
        }
    }

    /// Copies the rows selected by `mask` into new storage.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<EncodedMatrix> {
        if mask.len() != self.n_rows() {
            return Err(DiscretizeError::MaskLengthMismatch {
                expected: self.n_rows(),
                got: mask.len(),
            });
        }
        Ok(match self {
            EncodedMatrix::Dense(m) => {
                let rows: Vec<usize> = mask
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &keep)| keep.then_some(i))
                    .collect();
                EncodedMatrix::Dense(m.select(Axis(0), &rows))
            }
            EncodedMatrix::Sparse(m) => EncodedMatrix::Sparse(m.filter_rows(mask)),
        })
    }

    pub fn to_dense(&self) -> Array2<Code> {
        match self {
            EncodedMatrix::Dense(m) => m.clone(),
            EncodedMatrix::Sparse(m) => m.to_dense(),
        }
    }
}

impl From<Array2<Code>> for EncodedMatrix {
    fn from(m: Array2<Code>) -> Self {
        EncodedMatrix::Dense(m)
    }
}

impl From<CsrMatrix> for EncodedMatrix {
    fn from(m: CsrMatrix) -> Self {
        EncodedMatrix::Sparse(m)
    }
}
