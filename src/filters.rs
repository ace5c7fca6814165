// src/filters.rs
//! Filter expressions restricting which slices the search engine considers.
//!
//! Like [`Slice`](crate::slices::Slice), a filter is generic over feature ids
//! and values, so the encoded form (`SliceFilter<ColumnKey, Code>`) and the
//! decoded form (`SliceFilter<String, Label>`) are distinct types.

use serde::{Deserialize, Serialize};

use crate::core::{Code, ColumnKey, Label};

/// Whether a leaf removes the named values or keeps only them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Exclude,
    IncludeOnly,
}

/// Borrowed view of a leaf node, handed to [`SliceFilter::replace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterLeaf<'a, F, V> {
    Value {
        kind: LeafKind,
        feature: &'a F,
        value: &'a V,
    },
    ValueSet {
        kind: LeafKind,
        features: &'a [F],
        values: &'a [V],
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SliceFilter<F, V> {
    /// Constrains nothing.
    NoOp,
    ExcludeValue { feature: F, value: V },
    IncludeOnlyValue { feature: F, value: V },
    /// The value set applies to every listed feature.
    ExcludeValueSet { features: Vec<F>, values: Vec<V> },
    IncludeOnlyValueSet { features: Vec<F>, values: Vec<V> },
    /// Excludes a slice if any child filter excludes it.
    ExcludeIfAny { filters: Vec<SliceFilter<F, V>> },
    /// Excludes a slice only if every child filter excludes it.
    ExcludeIfAll { filters: Vec<SliceFilter<F, V>> },
}

pub type EncodedFilter = SliceFilter<ColumnKey, Code>;
pub type DecodedFilter = SliceFilter<String, Label>;

impl<F, V> SliceFilter<F, V> {
    pub fn value(kind: LeafKind, feature: F, value: V) -> Self {
        match kind {
            LeafKind::Exclude => SliceFilter::ExcludeValue { feature, value },
            LeafKind::IncludeOnly => SliceFilter::IncludeOnlyValue { feature, value },
        }
    }

    pub fn value_set(kind: LeafKind, features: Vec<F>, values: Vec<V>) -> Self {
        match kind {
            LeafKind::Exclude => SliceFilter::ExcludeValueSet { features, values },
            LeafKind::IncludeOnly => SliceFilter::IncludeOnlyValueSet { features, values },
        }
    }

    /// Joins leaves split out of one set leaf of the given kind.
    ///
    /// Excluding on any group generalizes an exclude leaf; an include-only
    /// leaf excludes a slice only when every group rejects it.
    pub fn join_split(kind: LeafKind, filters: Vec<SliceFilter<F, V>>) -> Self {
        match kind {
            LeafKind::Exclude => SliceFilter::ExcludeIfAny { filters },
            LeafKind::IncludeOnly => SliceFilter::ExcludeIfAll { filters },
        }
    }

    /// The leaf view of this node, or `None` for `NoOp` and combinators.
    pub fn as_leaf(&self) -> Option<FilterLeaf<'_, F, V>> {
        match self {
            SliceFilter::ExcludeValue { feature, value } => Some(FilterLeaf::Value {
                kind: LeafKind::Exclude,
                feature,
                value,
            }),
            SliceFilter::IncludeOnlyValue { feature, value } => Some(FilterLeaf::Value {
                kind: LeafKind::IncludeOnly,
                feature,
                value,
            }),
            SliceFilter::ExcludeValueSet { features, values } => Some(FilterLeaf::ValueSet {
                kind: LeafKind::Exclude,
                features,
                values,
            }),
            SliceFilter::IncludeOnlyValueSet { features, values } => Some(FilterLeaf::ValueSet {
                kind: LeafKind::IncludeOnly,
                features,
                values,
            }),
            SliceFilter::NoOp
            | SliceFilter::ExcludeIfAny { .. }
            | SliceFilter::ExcludeIfAll { .. } => None,
        }
    }

    /// Rewrites the tree, replacing every leaf with `replacer`'s result.
    ///
    /// `NoOp` nodes stay `NoOp` and combinators are rebuilt over their
    /// rewritten children. The first error aborts the rewrite.
    pub fn replace<G, W, E, R>(&self, replacer: &mut R) -> Result<SliceFilter<G, W>, E>
    where
        R: FnMut(FilterLeaf<'_, F, V>) -> Result<SliceFilter<G, W>, E>,
    {
        match self {
            SliceFilter::NoOp => Ok(SliceFilter::NoOp),
            SliceFilter::ExcludeIfAny { filters } => Ok(SliceFilter::ExcludeIfAny {
                filters: filters
                    .iter()
                    .map(|child| child.replace(&mut *replacer))
                    .collect::<Result<_, E>>()?,
            }),
            SliceFilter::ExcludeIfAll { filters } => Ok(SliceFilter::ExcludeIfAll {
                filters: filters
                    .iter()
                    .map(|child| child.replace(&mut *replacer))
                    .collect::<Result<_, E>>()?,
            }),
            leaf => match leaf.as_leaf() {
                Some(view) => replacer(view),
                None => Ok(SliceFilter::NoOp),
            },
        }
    }

    /// Every feature referenced by a leaf, in tree order.
    pub fn features(&self) -> Vec<&F> {
        match self {
            SliceFilter::NoOp => Vec::new(),
            SliceFilter::ExcludeValue { feature, .. }
            | SliceFilter::IncludeOnlyValue { feature, .. } => {
                vec![feature]
            }
            SliceFilter::ExcludeValueSet { features, .. }
            | SliceFilter::IncludeOnlyValueSet { features, .. } => {
                features.iter().collect()
            }
            SliceFilter::ExcludeIfAny { filters } | SliceFilter::ExcludeIfAll { filters } => {
                filters.iter().flat_map(|child| child.features()).collect()
            }
        }
    }
}

impl<F, V> Default for SliceFilter<F, V> {
    fn default() -> Self {
        SliceFilter::NoOp
    }
}
