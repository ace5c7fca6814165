// src/algorithms/token_sets.rs
//! Discretization of token sets into a sparse binary presence matrix.
//!
//! Each token (or group of tokens, with a predefined mapping) becomes one
//! binary column. Columns are ordered by how often they occur, most frequent
//! first, and can be pruned by frequency and count.

use std::collections::HashMap;

use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{ColumnDescription, CsrMatrix, DiscretizedData, Label, LabelMap};

/// Options for [`discretize_token_sets`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSetOptions {
    /// Fixed token -> column index mapping. Several tokens may share an
    /// index. Tokens outside the mapping are ignored. Without a mapping the
    /// vocabulary is built from the input in first-seen order.
    pub token_idx_mapping: Option<IndexMap<String, usize>>,
    /// Keep at most this many columns after ordering by occurrence rate.
    pub n_top_columns: Option<usize>,
    /// Drop columns whose occurrence rate is at or above this value.
    pub max_column_mean: Option<f64>,
    /// Show a spinner while reading token sets.
    pub show_progress: bool,
}

impl TokenSetOptions {
    pub fn with_token_idx_mapping(mut self, mapping: IndexMap<String, usize>) -> Self {
        self.token_idx_mapping = Some(mapping);
        self
    }

    pub fn with_n_top_columns(mut self, n: usize) -> Self {
        self.n_top_columns = Some(n);
        self
    }

    pub fn with_max_column_mean(mut self, max_mean: f64) -> Self {
        self.max_column_mean = Some(max_mean);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

fn presence_labels() -> LabelMap {
    LabelMap::from([(0, Label::Int(0)), (1, Label::Int(1))])
}

fn progress_bar(show_progress: bool) -> ProgressBar {
    if !show_progress {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    let template = "{spinner} {pos} token sets [{elapsed_precise}]";
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style);
    }
    pb
}

/// Builds a binary dataset with one row per token set and one column per
/// token (group).
///
/// Duplicate tokens within a set count once. Column `j` of the result is the
/// `j`-th most frequent remaining token column, ties going to the lower
/// vocabulary index. Each column is named by its tokens joined with `", "`
/// and labelled `{0: 0, 1: 1}`.
pub fn discretize_token_sets<I, S, T>(token_sets: I, options: &TokenSetOptions) -> DiscretizedData
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let predefined = options.token_idx_mapping.is_some();
    let mut vocab: IndexMap<String, usize> = options.token_idx_mapping.clone().unwrap_or_default();

    let pb = progress_bar(options.show_progress);
    let mut row_ptrs = vec![0];
    let mut col_indices: Vec<u32> = Vec::new();
    for token_set in token_sets {
        for token in token_set {
            let token = token.as_ref();
            let idx = match vocab.get(token) {
                Some(&idx) => idx,
                None if predefined => continue,
                None => {
                    let idx = vocab.len();
                    vocab.insert(token.to_string(), idx);
                    idx
                }
            };
            col_indices.push(idx as u32);
        }
        row_ptrs.push(col_indices.len());
        pb.inc(1);
    }
    pb.finish_and_clear();

    let n_vocab_cols = if predefined {
        vocab.values().max().map_or(0, |&max| max + 1)
    } else {
        vocab.len()
    };
    let matrix = CsrMatrix::from_binary_parts(row_ptrs, col_indices, n_vocab_cols);

    let mut tokens_by_col: HashMap<usize, Vec<&str>> = HashMap::new();
    for (token, &col) in &vocab {
        tokens_by_col.entry(col).or_default().push(token.as_str());
    }

    let rates = matrix.column_means();
    // Indices no token maps to are always empty and have no name.
    let mut order: Vec<usize> = (0..n_vocab_cols)
        .filter(|col| tokens_by_col.contains_key(col))
        .collect();
    // Stable, so equal rates keep ascending vocabulary order.
    order.sort_by(|&a, &b| rates[b].total_cmp(&rates[a]));

    if let Some(max_mean) = options.max_column_mean {
        let before = order.len();
        order.retain(|&col| rates[col] < max_mean);
        let excluded = before - order.len();
        if excluded > 0 {
            info!(
                excluded,
                max_column_mean = max_mean,
                "excluding columns at or above max column mean"
            );
        }
    }
    if let Some(n_top) = options.n_top_columns {
        if n_top > order.len() {
            debug!(n_top, available = order.len(), "fewer columns than requested top columns");
        }
        order.truncate(n_top);
    }

    let value_names: Vec<ColumnDescription> = order
        .iter()
        .map(|col| ColumnDescription::new(tokens_by_col[col].join(", "), presence_labels()))
        .collect();

    let matrix = matrix.select_columns(&order);
    info!(
        rows = matrix.num_rows(),
        columns = matrix.num_cols(),
        vocabulary = n_vocab_cols,
        "discretized token sets"
    );
    DiscretizedData::new(matrix, value_names)
}
