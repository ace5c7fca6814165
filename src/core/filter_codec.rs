// src/core/filter_codec.rs
//! Translation of filter trees between decoded and encoded names.
//!
//! Set leaves name several features that share one value set. After
//! translation those features may disagree on the resulting value set, so the
//! features are regrouped by their translated (sorted) values and each group
//! becomes its own leaf.

use std::convert::Infallible;
use std::hash::Hash;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::data::{Code, ColumnKey, Label};
use crate::core::discretized::DiscretizedData;
use crate::core::errors::{DiscretizeError, Result};
use crate::filters::{DecodedFilter, EncodedFilter, FilterLeaf, LeafKind, SliceFilter};

/// Builds the replacement for a set leaf from features grouped by value set.
fn regroup<F, V: Eq + Hash>(kind: LeafKind, groups: IndexMap<Vec<V>, Vec<F>>) -> SliceFilter<F, V> {
    let mut leaves: Vec<SliceFilter<F, V>> = groups
        .into_iter()
        .map(|(values, features)| SliceFilter::value_set(kind, features, values))
        .collect();
    match leaves.len() {
        0 => SliceFilter::NoOp,
        1 => leaves.remove(0),
        _ => SliceFilter::join_split(kind, leaves),
    }
}

impl DiscretizedData {
    /// Converts a filter over original names and labels into encoded keys and codes.
    ///
    /// Never fails: features this dataset does not know are dropped, and
    /// unknown labels are left out of the translated value sets.
    pub fn encode_filter(&self, filter: &DecodedFilter) -> EncodedFilter {
        let encoded: std::result::Result<EncodedFilter, Infallible> =
            filter.replace(&mut |leaf| Ok(self.encode_leaf(leaf)));
        match encoded {
            Ok(encoded) => encoded,
            Err(never) => match never {},
        }
    }

    fn encode_leaf(&self, leaf: FilterLeaf<'_, String, Label>) -> EncodedFilter {
        match leaf {
            FilterLeaf::Value { kind, feature, value } => {
                let Some(enc) = self.inverse_value_mapping().get(feature) else {
                    debug!(feature = %feature, "dropping filter on unknown feature");
                    return SliceFilter::NoOp;
                };
                match (enc.codes.get(value), kind) {
                    (Some(&code), _) => SliceFilter::value(kind, enc.key, code),
                    // Excluding a value the column never takes constrains nothing.
                    (None, LeafKind::Exclude) => SliceFilter::NoOp,
                    (None, LeafKind::IncludeOnly) => {
                        SliceFilter::value_set(kind, vec![enc.key], Vec::new())
                    }
                }
            }
            FilterLeaf::ValueSet { kind, features, values } => {
                let mut groups: IndexMap<Vec<Code>, Vec<ColumnKey>> = IndexMap::new();
                for feature in features {
                    let Some(enc) = self.inverse_value_mapping().get(feature) else {
                        debug!(feature = %feature, "dropping unknown feature from set filter");
                        continue;
                    };
                    let mut codes: Vec<Code> =
                        values.iter().filter_map(|v| enc.codes.get(v).copied()).collect();
                    codes.sort_unstable();
                    codes.dedup();
                    groups.entry(codes).or_default().push(enc.key);
                }
                regroup(kind, groups)
            }
        }
    }

    /// Converts an encoded filter back to original names and labels.
    ///
    /// Fails on any column key or code this dataset does not know.
    pub fn decode_filter(&self, filter: &EncodedFilter) -> Result<DecodedFilter> {
        filter.replace(&mut |leaf| self.decode_leaf(leaf))
    }

    fn decode_leaf(&self, leaf: FilterLeaf<'_, ColumnKey, Code>) -> Result<DecodedFilter> {
        match leaf {
            FilterLeaf::Value { kind, feature, value } => {
                let (name, label) = self.decode_value(*feature, *value)?;
                Ok(SliceFilter::value(kind, name.to_string(), label.clone()))
            }
            FilterLeaf::ValueSet { kind, features, values } => {
                let mut groups: IndexMap<Vec<Label>, Vec<String>> = IndexMap::new();
                for &key in features {
                    let desc = self
                        .value_names()
                        .get(key)
                        .ok_or(DiscretizeError::UnknownColumnKey(key))?;
                    let mut labels = values
                        .iter()
                        .map(|&code| self.decode_value(key, code).map(|(_, label)| label.clone()))
                        .collect::<Result<Vec<_>>>()?;
                    labels.sort();
                    labels.dedup();
                    groups.entry(labels).or_default().push(desc.name.clone());
                }
                Ok(regroup(kind, groups))
            }
        }
    }
}
