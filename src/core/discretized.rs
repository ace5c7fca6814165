// src/core/discretized.rs
//! The encoded dataset and its name mappings.

use crate::core::data::{Code, ColumnKey, InverseValueMapping, Label, ValueNames};
use crate::core::errors::{DiscretizeError, Result};
use crate::core::matrix::EncodedMatrix;
use crate::slices::{EncodedSlice, Slice, SliceDescription, SliceFeature};

/// An integer-coded matrix together with the mappings between its encoded
/// column keys/codes and the original column names/labels.
///
/// The dataset is immutable once built; consumers read it or derive filtered
/// copies.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscretizedData {
    matrix: EncodedMatrix,
    value_names: ValueNames,
    /// Derived from `value_names` at construction, never mutated on its own.
    inverse_value_mapping: InverseValueMapping,
}

impl DiscretizedData {
    /// Wraps an encoded matrix and its column descriptions.
    ///
    /// `value_names` may be a `Vec<ColumnDescription>` (column keys are list
    /// positions) or an explicit collection of `(ColumnKey, ColumnDescription)`.
    pub fn new(matrix: impl Into<EncodedMatrix>, value_names: impl Into<ValueNames>) -> Self {
        let value_names = value_names.into();
        let inverse_value_mapping = value_names
            .iter()
            .map(|(&key, desc)| (desc.name.clone(), desc.invert(key)))
            .collect();
        DiscretizedData {
            matrix: matrix.into(),
            value_names,
            inverse_value_mapping,
        }
    }

    pub fn matrix(&self) -> &EncodedMatrix {
        &self.matrix
    }

    pub fn value_names(&self) -> &ValueNames {
        &self.value_names
    }

    pub fn inverse_value_mapping(&self) -> &InverseValueMapping {
        &self.inverse_value_mapping
    }

    pub fn n_rows(&self) -> usize {
        self.matrix.n_rows()
    }

    pub fn n_cols(&self) -> usize {
        self.matrix.n_cols()
    }

    /// True if `column_name` is a decoded column of this dataset.
    pub fn contains(&self, column_name: &str) -> bool {
        self.inverse_value_mapping.contains_key(column_name)
    }

    /// Decoded column names in construction order.
    pub fn column_names(&self) -> Vec<&str> {
        self.inverse_value_mapping.keys().map(String::as_str).collect()
    }

    /// A new dataset holding a copy of the rows selected by `mask`.
    pub fn filter(&self, mask: &[bool]) -> Result<DiscretizedData> {
        Ok(DiscretizedData {
            matrix: self.matrix.filter_rows(mask)?,
            value_names: self.value_names.clone(),
            inverse_value_mapping: self.inverse_value_mapping.clone(),
        })
    }

    /// Column name and label for an encoded value.
    pub fn decode_value(&self, key: ColumnKey, code: Code) -> Result<(&str, &Label)> {
        let desc = self
            .value_names
            .get(key)
            .ok_or(DiscretizeError::UnknownColumnKey(key))?;
        let label = desc.values.get(&code).ok_or_else(|| DiscretizeError::UnknownCode {
            key,
            column: desc.name.clone(),
            code,
            labels: desc.format_values(),
        })?;
        Ok((desc.name.as_str(), label))
    }

    /// Column key and code for a decoded value.
    pub fn encode_value(&self, column_name: &str, label: &Label) -> Result<(ColumnKey, Code)> {
        let enc = self
            .inverse_value_mapping
            .get(column_name)
            .ok_or_else(|| DiscretizeError::UnknownFeature(column_name.to_string()))?;
        let code = enc.codes.get(label).ok_or_else(|| DiscretizeError::UnknownLabel {
            feature: column_name.to_string(),
            label: label.to_string(),
            labels: enc.format_codes(),
        })?;
        Ok((enc.key, *code))
    }

    /// Describes an encoded slice with original column names and labels.
    pub fn describe_slice(&self, slice: &EncodedSlice) -> Result<SliceDescription> {
        let described = slice.transform_features(|feature| -> Result<SliceFeature<String, Label>> {
            let desc = self
                .value_names
                .get(feature.feature)
                .ok_or(DiscretizeError::UnknownColumnKey(feature.feature))?;
            let labels = feature
                .allowed_values
                .iter()
                .map(|&code| self.decode_value(feature.feature, code))
                .map(|decoded| decoded.map(|(_, label)| label.clone()))
                .collect::<Result<Vec<_>>>()?;
            Ok(SliceFeature::new(desc.name.clone(), labels))
        })?;
        Ok(described.to_dict())
    }

    /// Converts a described slice back to the encoded representation.
    pub fn encode_slice(&self, description: &SliceDescription) -> Result<EncodedSlice> {
        let slice = Slice::from_dict(description);
        slice.transform_features(|feature| -> Result<SliceFeature<ColumnKey, Code>> {
            let codes = feature
                .allowed_values
                .iter()
                .map(|label| self.encode_value(&feature.feature, label).map(|(_, code)| code))
                .collect::<Result<Vec<_>>>()?;
            let key = match self.inverse_value_mapping.get(&feature.feature) {
                Some(enc) => enc.key,
                None => return Err(DiscretizeError::UnknownFeature(feature.feature.clone())),
            };
            Ok(SliceFeature::new(key, codes))
        })
    }

    /// Decoded `(column name, label)` pairs of one row, in column order.
    pub fn decode_row(&self, row: usize) -> Result<Vec<(&str, &Label)>> {
        if row >= self.n_rows() {
            return Err(DiscretizeError::RowOutOfRange {
                row,
                n_rows: self.n_rows(),
            });
        }
        self.value_names
            .iter()
            .map(|(&key, _)| {
                if key >= self.n_cols() {
                    return Err(DiscretizeError::UnknownColumnKey(key));
                }
                self.decode_value(key, self.matrix.get(row, key))
            })
            .collect()
    }
}
