// src/core/data.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An encoded value. The encoded matrix is 8 bits wide, so each column holds
/// at most 256 distinct codes.
pub type Code = u8;

/// Identifies a column of the encoded matrix (its positional index).
pub type ColumnKey = usize;

/// Largest code the encoded matrix can hold.
pub const MAX_CODE: usize = Code::MAX as usize;

/// A decoded, human-readable value.
///
/// `Int` labels come from columns kept as-is and from presence/absence columns;
/// `Text` labels from bin intervals, categorical values and user-supplied names.
/// Every `Int` orders before every `Text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(v) => write!(f, "{}", v),
            Label::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Label::Int(v)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::Text(s)
    }
}

/// Encoded value -> decoded label, for one column.
pub type LabelMap = BTreeMap<Code, Label>;

/// Original name and label map of one encoded column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    pub values: LabelMap,
}

impl ColumnDescription {
    pub fn new(name: impl Into<String>, values: LabelMap) -> Self {
        ColumnDescription {
            name: name.into(),
            values,
        }
    }

    /// Builds the decoded -> encoded side for this column. Duplicate labels
    /// overwrite each other; the last code wins.
    pub fn invert(&self, key: ColumnKey) -> ColumnEncoding {
        ColumnEncoding {
            key,
            codes: self.values.iter().map(|(code, label)| (label.clone(), *code)).collect(),
        }
    }

    pub(crate) fn format_values(&self) -> String {
        let entries: Vec<String> = self
            .values
            .iter()
            .map(|(code, label)| format!("{}: {}", code, label))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}

/// Encoded column key and label -> code map for one decoded column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEncoding {
    pub key: ColumnKey,
    pub codes: BTreeMap<Label, Code>,
}

impl ColumnEncoding {
    pub(crate) fn format_codes(&self) -> String {
        let entries: Vec<String> = self
            .codes
            .iter()
            .map(|(label, code)| format!("{}: {}", label, code))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}

/// Column descriptions keyed by encoded column key, in construction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueNames(IndexMap<ColumnKey, ColumnDescription>);

impl ValueNames {
    pub fn get(&self, key: ColumnKey) -> Option<&ColumnDescription> {
        self.0.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnKey, &ColumnDescription)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Positional descriptions: the list index becomes the column key.
impl From<Vec<ColumnDescription>> for ValueNames {
    fn from(columns: Vec<ColumnDescription>) -> Self {
        ValueNames(columns.into_iter().enumerate().collect())
    }
}

impl FromIterator<(ColumnKey, ColumnDescription)> for ValueNames {
    fn from_iter<I: IntoIterator<Item = (ColumnKey, ColumnDescription)>>(iter: I) -> Self {
        ValueNames(iter.into_iter().collect())
    }
}

/// Decoded column name -> encoded side, in construction order.
pub type InverseValueMapping = IndexMap<String, ColumnEncoding>;
