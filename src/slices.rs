// src/slices.rs
//! Slices: conjunctions of per-feature constraints.
//!
//! A slice is generic over how features and values are named. Inside the
//! search engine a slice is `Slice<ColumnKey, Code>`; once described for a
//! reader, the same constraints are keyed by column name and carry labels.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use crate::core::{Code, ColumnKey, Label};

/// Restricts one feature to any of a set of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SliceFeature<F, V> {
    pub feature: F,
    pub allowed_values: Vec<V>,
}

impl<F, V> SliceFeature<F, V> {
    pub fn new(feature: F, allowed_values: Vec<V>) -> Self {
        SliceFeature {
            feature,
            allowed_values,
        }
    }
}

/// A conjunction of feature constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slice<F, V> {
    features: Vec<SliceFeature<F, V>>,
}

/// Slice as produced and consumed by the search engine.
pub type EncodedSlice = Slice<ColumnKey, Code>;

/// Plain mapping form of a described slice: column name -> allowed labels.
pub type SliceDescription = IndexMap<String, Vec<Label>>;

impl<F, V> Slice<F, V> {
    pub fn new(features: Vec<SliceFeature<F, V>>) -> Self {
        Slice { features }
    }

    /// The slice with no constraints, i.e. the whole dataset.
    pub fn empty() -> Self {
        Slice { features: Vec::new() }
    }

    pub fn features(&self) -> &[SliceFeature<F, V>] {
        &self.features
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Rebuilds the slice from `f` applied to every feature constraint.
    /// Stops at the first error.
    pub fn transform_features<G, W, E, T>(&self, mut f: T) -> Result<Slice<G, W>, E>
    where
        T: FnMut(&SliceFeature<F, V>) -> Result<SliceFeature<G, W>, E>,
    {
        let features = self.features.iter().map(&mut f).collect::<Result<Vec<_>, E>>()?;
        Ok(Slice { features })
    }
}

impl<F: Hash + Eq + Clone, V: Clone> Slice<F, V> {
    /// Converts to a feature -> allowed values mapping, in constraint order.
    pub fn to_dict(&self) -> IndexMap<F, Vec<V>> {
        self.features
            .iter()
            .map(|feature| (feature.feature.clone(), feature.allowed_values.clone()))
            .collect()
    }

    pub fn from_dict(dict: &IndexMap<F, Vec<V>>) -> Self {
        Slice {
            features: dict
                .iter()
                .map(|(feature, values)| SliceFeature::new(feature.clone(), values.clone()))
                .collect(),
        }
    }
}

impl<F: fmt::Display, V: fmt::Display> fmt::Display for Slice<F, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.features.is_empty() {
            return write!(f, "(all)");
        }
        for (i, feature) in self.features.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match feature.allowed_values.as_slice() {
                [single] => write!(f, "{} = {}", feature.feature, single)?,
                values => {
                    let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                    write!(f, "{} in ({})", feature.feature, rendered.join(", "))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_form_preserves_constraint_order() {
        let slice: EncodedSlice = Slice::new(vec![
            SliceFeature::new(3, vec![1]),
            SliceFeature::new(0, vec![2, 0]),
        ]);
        let dict = slice.to_dict();
        assert_eq!(dict.keys().copied().collect::<Vec<_>>(), vec![3, 0]);
        assert_eq!(Slice::from_dict(&dict), slice);
    }

    #[test]
    fn transform_stops_at_first_error() {
        let slice: EncodedSlice = Slice::new(vec![
            SliceFeature::new(0, vec![1]),
            SliceFeature::new(1, vec![1]),
        ]);
        let mut seen = 0;
        let result: Result<Slice<usize, u8>, String> = slice.transform_features(|f| {
            seen += 1;
            if f.feature == 0 {
                Err("boom".to_string())
            } else {
                Ok(f.clone())
            }
        });
        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(seen, 1);
    }

    #[test]
    fn display_lists_constraints() {
        let slice = Slice::new(vec![
            SliceFeature::new("age".to_string(), vec![Label::from("< 30")]),
            SliceFeature::new("color".to_string(), vec![Label::from("red"), Label::from("blue")]),
        ]);
        assert_eq!(slice.to_string(), "age = < 30, color in (red, blue)");
        assert_eq!(Slice::<String, Label>::empty().to_string(), "(all)");
    }
}
