// src/algorithms/tabular.rs
//! Discretization of tabular data according to per-column rules.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use ndarray::{Array2, ShapeBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algorithms::bin_labels::represent_bin;
use crate::core::{
    Code, ColumnDescription, ColumnValues, DiscretizeError, DiscretizedData, Frame, Label, LabelMap,
    Result, MAX_CODE,
};
use crate::traits::{ColumnEncoder, EncodedColumn};
use crate::utils::quantiles;

/// A user-supplied encoder used as a column rule.
#[derive(Clone)]
pub struct CustomEncoder(pub Arc<dyn ColumnEncoder>);

impl fmt::Debug for CustomEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomEncoder(..)")
    }
}

/// How one source column is discretized.
///
/// Rules deserialize from JSON objects tagged by `"method"`, e.g.
/// `{"method": "bin", "quantiles": [0.25, 0.5, 0.75]}`. `Custom` rules can only
/// be built in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum ColumnRule {
    /// Values are already small non-negative integers and pass through.
    Keep,
    /// Numeric values are bucketed by explicit `bins` cutoffs or by the given
    /// `quantiles` of the column. `bins` takes precedence when both are set.
    Bin {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bins: Option<Vec<f64>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quantiles: Option<Vec<f64>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        names: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nan_name: Option<String>,
    },
    /// Values are categories, coded in sorted order of their string form.
    Unique {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nan_name: Option<String>,
    },
    #[serde(skip)]
    Custom(CustomEncoder),
}

impl ColumnRule {
    pub fn keep() -> Self {
        ColumnRule::Keep
    }

    pub fn bins(cutoffs: Vec<f64>) -> Self {
        ColumnRule::Bin {
            bins: Some(cutoffs),
            quantiles: None,
            names: None,
            nan_name: None,
        }
    }

    pub fn quantiles(quantiles: Vec<f64>) -> Self {
        ColumnRule::Bin {
            bins: None,
            quantiles: Some(quantiles),
            names: None,
            nan_name: None,
        }
    }

    pub fn unique() -> Self {
        ColumnRule::Unique { nan_name: None }
    }

    pub fn custom<F>(encoder: F) -> Self
    where
        F: Fn(&ColumnValues, &str) -> Result<EncodedColumn> + Send + Sync + 'static,
    {
        ColumnRule::Custom(CustomEncoder(Arc::new(encoder)))
    }

    pub fn custom_encoder(encoder: impl ColumnEncoder + 'static) -> Self {
        ColumnRule::Custom(CustomEncoder(Arc::new(encoder)))
    }

    /// Sets explicit bucket names. Only affects `Bin` rules.
    pub fn with_names(mut self, bucket_names: Vec<String>) -> Self {
        if let ColumnRule::Bin { names, .. } = &mut self {
            *names = Some(bucket_names);
        }
        self
    }

    /// Gives missing values their own code and label. Only affects `Bin` and
    /// `Unique` rules.
    pub fn with_nan_name(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            ColumnRule::Bin { nan_name, .. } | ColumnRule::Unique { nan_name } => {
                *nan_name = Some(name.into())
            }
            ColumnRule::Keep | ColumnRule::Custom(_) => {}
        }
        self
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            ColumnRule::Keep => "keep",
            ColumnRule::Bin { .. } => "bin",
            ColumnRule::Unique { .. } => "unique",
            ColumnRule::Custom(_) => "custom",
        }
    }
}

/// Source column name -> rule. Iteration order fixes the encoded column order.
pub type DiscretizationSpec = IndexMap<String, ColumnRule>;

/// Parses a discretization spec from a JSON object of rules.
pub fn spec_from_json(json: &str) -> Result<DiscretizationSpec> {
    Ok(serde_json::from_str(json)?)
}

/// Discretizes `frame` according to `spec`.
///
/// The result has one column per spec entry, in spec order, keyed by
/// position. A failure in any column aborts the run and names that column.
pub fn discretize_data(frame: &Frame, spec: &DiscretizationSpec) -> Result<DiscretizedData> {
    let n_rows = frame.n_rows();
    // Column-major buffer, one column after another.
    let mut codes = Vec::with_capacity(n_rows * spec.len());
    let mut descriptions = Vec::with_capacity(spec.len());

    for (column, rule) in spec {
        let (column_codes, labels) =
            discretize_column(frame, column, rule).map_err(|e| e.in_column(column.as_str()))?;
        codes.extend(column_codes);
        debug!(
            column = %column,
            method = rule.method_name(),
            n_codes = labels.len(),
            "discretized column"
        );
        descriptions.push(ColumnDescription::new(column.as_str(), labels));
    }

    let matrix = Array2::from_shape_vec((n_rows, spec.len()).f(), codes)?;
    info!(rows = n_rows, columns = spec.len(), "discretized tabular data");
    Ok(DiscretizedData::new(matrix.as_standard_layout().into_owned(), descriptions))
}

fn discretize_column(
    frame: &Frame,
    column: &str,
    rule: &ColumnRule,
) -> Result<(Vec<Code>, LabelMap)> {
    let values = frame
        .column(column)
        .ok_or_else(|| DiscretizeError::UnknownColumn(column.to_string()))?;
    match rule {
        ColumnRule::Keep => keep_column(values),
        ColumnRule::Bin {
            bins,
            quantiles,
            names,
            nan_name,
        } => bin_column(
            values,
            bins.as_deref(),
            quantiles.as_deref(),
            names.as_deref(),
            nan_name.as_deref(),
        ),
        ColumnRule::Unique { nan_name } => unique_column(values, nan_name.as_deref()),
        ColumnRule::Custom(CustomEncoder(encoder)) => {
            custom_column(values, column, encoder.as_ref())
        }
    }
}

fn check_code(code: usize) -> Result<Code> {
    Code::try_from(code).map_err(|_| DiscretizeError::CodeOverflow { code, max: MAX_CODE })
}

fn identity_labels(codes: &[Code]) -> LabelMap {
    codes.iter().map(|&c| (c, Label::Int(c as i64))).collect()
}

fn keep_column(values: &ColumnValues) -> Result<(Vec<Code>, LabelMap)> {
    let codes = match values {
        ColumnValues::Int(v) => v
            .iter()
            .map(|&x| {
                usize::try_from(x)
                    .ok()
                    .and_then(|x| Code::try_from(x).ok())
                    .ok_or(DiscretizeError::InvalidKeepValue { value: x.to_string() })
            })
            .collect::<Result<Vec<_>>>()?,
        ColumnValues::Float(v) => v
            .iter()
            .map(|&x| {
                if x.fract() == 0.0 && (0.0..=MAX_CODE as f64).contains(&x) {
                    Ok(x as Code)
                } else {
                    Err(DiscretizeError::InvalidKeepValue { value: format!("{:?}", x) })
                }
            })
            .collect::<Result<Vec<_>>>()?,
        ColumnValues::Text(_) => {
            return Err(DiscretizeError::UnsupportedColumnType {
                method: "keep",
                kind: values.kind(),
            })
        }
    };
    let labels = identity_labels(&codes);
    Ok((codes, labels))
}

fn bin_column(
    values: &ColumnValues,
    bins: Option<&[f64]>,
    quantile_fractions: Option<&[f64]>,
    names: Option<&[String]>,
    nan_name: Option<&str>,
) -> Result<(Vec<Code>, LabelMap)> {
    let numeric = values.as_f64().ok_or(DiscretizeError::UnsupportedColumnType {
        method: "bin",
        kind: values.kind(),
    })?;

    // Quantile-derived buckets are labelled with the quantile fractions.
    let (cutoffs, label_cutoffs, quantile) = match (bins, quantile_fractions) {
        (Some(bins), _) if !bins.is_empty() => (bins.to_vec(), bins.to_vec(), false),
        (_, Some(qs)) if !qs.is_empty() => (quantiles(&numeric, qs)?, qs.to_vec(), true),
        _ => return Err(DiscretizeError::MissingCutoffs),
    };
    if cutoffs.windows(2).any(|w| w[0] > w[1]) {
        return Err(DiscretizeError::NonMonotonicCutoffs { cutoffs });
    }

    let n_buckets = cutoffs.len() + 1;
    let nan_code = match nan_name {
        Some(_) => Some(check_code(n_buckets)?),
        None => {
            check_code(n_buckets - 1)?;
            None
        }
    };

    let mut labels: LabelMap = match names {
        Some(names) if names.len() != n_buckets => {
            return Err(DiscretizeError::NameCountMismatch {
                expected: n_buckets,
                got: names.len(),
            })
        }
        Some(names) => names
            .iter()
            .enumerate()
            .map(|(i, name)| (i as Code, Label::Text(name.clone())))
            .collect(),
        None => (0..n_buckets)
            .map(|i| (i as Code, Label::Text(represent_bin(&label_cutoffs, i, quantile))))
            .collect(),
    };

    let missing = values.missing_count();
    let codes = match (nan_code, nan_name) {
        (Some(nan_code), Some(nan_name)) => {
            labels.insert(nan_code, Label::Text(nan_name.to_string()));
            numeric
                .iter()
                .map(|&x| if x.is_nan() { nan_code } else { digitize(&cutoffs, x) })
                .collect()
        }
        _ if missing > 0 => return Err(DiscretizeError::MissingValues { count: missing }),
        _ => numeric.iter().map(|&x| digitize(&cutoffs, x)).collect(),
    };
    Ok((codes, labels))
}

/// Index `i` such that `cutoffs[i-1] <= x < cutoffs[i]`.
fn digitize(cutoffs: &[f64], x: f64) -> Code {
    cutoffs.partition_point(|&c| c <= x) as Code
}

fn unique_column(values: &ColumnValues, nan_name: Option<&str>) -> Result<(Vec<Code>, LabelMap)> {
    let strings: Vec<Option<String>> = (0..values.len()).map(|row| values.stringify(row)).collect();
    let unique: Vec<&str> = strings
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let nan_code = match nan_name {
        Some(_) => Some(check_code(unique.len())?),
        None => {
            if let Some(last) = unique.len().checked_sub(1) {
                check_code(last)?;
            }
            None
        }
    };
    let missing = values.missing_count();
    let code_of: HashMap<&str, Code> =
        unique.iter().enumerate().map(|(i, &u)| (u, i as Code)).collect();
    let codes = strings
        .iter()
        .map(|s| match s {
            Some(s) => Ok(code_of[s.as_str()]),
            None => nan_code.ok_or(DiscretizeError::MissingValues { count: missing }),
        })
        .collect::<Result<Vec<_>>>()?;

    let mut labels: LabelMap = unique
        .iter()
        .enumerate()
        .map(|(i, &u)| (i as Code, Label::Text(u.to_string())))
        .collect();
    if let (Some(nan_code), Some(nan_name)) = (nan_code, nan_name) {
        labels.insert(nan_code, Label::Text(nan_name.to_string()));
    }
    Ok((codes, labels))
}

fn custom_column(
    values: &ColumnValues,
    column: &str,
    encoder: &dyn ColumnEncoder,
) -> Result<(Vec<Code>, LabelMap)> {
    let encoded = encoder.encode(values, column)?;
    if encoded.codes.len() != values.len() {
        return Err(DiscretizeError::RowCountMismatch {
            column: column.to_string(),
            expected: values.len(),
            got: encoded.codes.len(),
        });
    }
    let codes = encoded
        .codes
        .iter()
        .map(|&c| check_code(c))
        .collect::<Result<Vec<_>>>()?;
    let labels = match encoded.labels {
        Some(labels) => labels,
        None => identity_labels(&codes),
    };
    Ok((codes, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use rstest::rstest;

    fn frame_with(name: &str, values: impl Into<ColumnValues>) -> Frame {
        Frame::new().with_column(name, values).unwrap()
    }

    fn column_codes(data: &DiscretizedData, col: usize) -> Vec<Code> {
        data.matrix().to_dense().column(col).to_vec()
    }

    fn spec(entries: Vec<(&str, ColumnRule)>) -> DiscretizationSpec {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[rstest]
    #[case(9.0, 0)]
    #[case(10.0, 1)]
    #[case(15.0, 1)]
    #[case(20.0, 2)]
    #[case(25.0, 2)]
    fn binning_is_left_closed(#[case] x: f64, #[case] bucket: Code) {
        assert_eq!(digitize(&[10.0, 20.0], x), bucket);
    }

    #[test]
    fn bin_with_cutoffs_labels_intervals() {
        let frame = frame_with("x", vec![9.0, 10.0, 20.0, 25.0]);
        let rule = ColumnRule::bins(vec![10.0, 20.0]);
        let data = discretize_data(&frame, &spec(vec![("x", rule)])).unwrap();
        assert_eq!(column_codes(&data, 0), vec![0, 1, 2, 2]);
        let desc = data.value_names().get(0).unwrap();
        assert_eq!(desc.name, "x");
        assert_eq!(
            desc.values.values().cloned().collect::<Vec<_>>(),
            vec![Label::from("< 10"), Label::from("10 - 20"), Label::from("> 20")]
        );
    }

    #[test]
    fn bin_with_quantiles_uses_percent_labels() {
        let values: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let frame = frame_with("score", values);
        let rule = ColumnRule::quantiles(vec![0.5]);
        let data = discretize_data(&frame, &spec(vec![("score", rule)])).unwrap();
        let codes = column_codes(&data, 0);
        assert_eq!(codes.iter().filter(|&&c| c == 0).count(), 50);
        assert_eq!(codes.iter().filter(|&&c| c == 1).count(), 50);
        let desc = data.value_names().get(0).unwrap();
        assert_eq!(desc.values[&0], Label::from("< 50%"));
        assert_eq!(desc.values[&1], Label::from("> 50%"));
    }

    #[test]
    fn bin_names_and_nan_bucket() {
        let frame = frame_with("x", vec![1.0, f64::NAN, 7.0]);
        let rule = ColumnRule::bins(vec![5.0])
            .with_names(vec!["low".into(), "high".into()])
            .with_nan_name("unknown");
        let data = discretize_data(&frame, &spec(vec![("x", rule)])).unwrap();
        assert_eq!(column_codes(&data, 0), vec![0, 2, 1]);
        let desc = data.value_names().get(0).unwrap();
        assert_eq!(desc.values[&2], Label::from("unknown"));
        assert_eq!(desc.values[&1], Label::from("high"));
    }

    #[test]
    fn bin_name_count_mismatch_names_the_column() {
        let frame = frame_with("age", vec![1.0, 2.0]);
        let rule = ColumnRule::bins(vec![5.0, 10.0]).with_names(vec!["a".into(), "b".into()]);
        let err = discretize_data(&frame, &spec(vec![("age", rule)])).unwrap_err();
        match err {
            DiscretizeError::Column { column, source } => {
                assert_eq!(column, "age");
                assert!(matches!(
                    *source,
                    DiscretizeError::NameCountMismatch { expected: 3, got: 2 }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bin_requires_cutoffs_and_complete_values() {
        let frame = frame_with("x", vec![1.0, f64::NAN]);
        let no_cutoffs = ColumnRule::Bin {
            bins: None,
            quantiles: None,
            names: None,
            nan_name: None,
        };
        let err = discretize_data(&frame, &spec(vec![("x", no_cutoffs)])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error discretizing column 'x': \
             one of 'bins' or 'quantiles' must be passed for binning discretization"
        );

        let err =
            discretize_data(&frame, &spec(vec![("x", ColumnRule::bins(vec![0.5]))])).unwrap_err();
        assert!(matches!(
            err,
            DiscretizeError::Column { source, .. }
                if matches!(*source, DiscretizeError::MissingValues { count: 1 })
        ));

        let rule = ColumnRule::bins(vec![2.0, 1.0]);
        let err = discretize_data(&frame, &spec(vec![("x", rule)])).unwrap_err();
        assert!(err.to_string().contains("non-decreasing"));
    }

    #[test]
    fn empty_bins_fall_back_to_quantiles() {
        let values: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let frame = frame_with("x", values);
        let rule = ColumnRule::Bin {
            bins: Some(vec![]),
            quantiles: Some(vec![0.5]),
            names: None,
            nan_name: None,
        };
        let data = discretize_data(&frame, &spec(vec![("x", rule)])).unwrap();
        assert_eq!(column_codes(&data, 0), vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
        assert_eq!(data.value_names().get(0).unwrap().values[&0], Label::from("< 50%"));
    }

    #[test]
    fn unique_codes_follow_sorted_values() {
        let frame = frame_with("c", vec!["b", "a", "c", "a"]);
        let data = discretize_data(&frame, &spec(vec![("c", ColumnRule::unique())])).unwrap();
        assert_eq!(column_codes(&data, 0), vec![1, 0, 2, 0]);
        let desc = data.value_names().get(0).unwrap();
        assert_eq!(
            desc.values,
            LabelMap::from([(0, Label::from("a")), (1, Label::from("b")), (2, Label::from("c"))])
        );

        let reordered = frame_with("c", vec!["c", "a", "b", "a"]);
        let again = discretize_data(&reordered, &spec(vec![("c", ColumnRule::unique())])).unwrap();
        assert_eq!(again.value_names(), data.value_names());
    }

    #[test]
    fn unique_nan_name_gets_terminal_code() {
        let frame = frame_with("c", vec![Some("x".to_string()), None, Some("w".to_string())]);
        let rule = ColumnRule::unique().with_nan_name("n/a");
        let data = discretize_data(&frame, &spec(vec![("c", rule)])).unwrap();
        assert_eq!(column_codes(&data, 0), vec![1, 2, 0]);
        assert_eq!(data.value_names().get(0).unwrap().values[&2], Label::from("n/a"));

        let err = discretize_data(&frame, &spec(vec![("c", ColumnRule::unique())])).unwrap_err();
        assert!(err.to_string().contains("1 missing value(s)"));
    }

    #[test]
    fn unique_overflow_fails_loudly() {
        let values: Vec<i64> = (0..300).collect();
        let frame = frame_with("id", values);
        let err = discretize_data(&frame, &spec(vec![("id", ColumnRule::unique())])).unwrap_err();
        assert!(matches!(
            err,
            DiscretizeError::Column { source, .. }
                if matches!(*source, DiscretizeError::CodeOverflow { code: 299, max: 255 })
        ));
    }

    #[test]
    fn keep_passes_values_through() {
        let frame = frame_with("k", vec![3i64, 0, 3, 1]);
        let data = discretize_data(&frame, &spec(vec![("k", ColumnRule::keep())])).unwrap();
        assert_eq!(column_codes(&data, 0), vec![3, 0, 3, 1]);
        assert_eq!(
            data.value_names().get(0).unwrap().values,
            LabelMap::from([(0, Label::Int(0)), (1, Label::Int(1)), (3, Label::Int(3))])
        );

        let bad = frame_with("k", vec![1.5]);
        assert!(discretize_data(&bad, &spec(vec![("k", ColumnRule::keep())])).is_err());
        let negative = frame_with("k", vec![-1i64]);
        assert!(discretize_data(&negative, &spec(vec![("k", ColumnRule::keep())])).is_err());
    }

    #[test]
    fn custom_encoder_output_is_used() {
        let frame = frame_with("t", vec![0.2, 0.9, 0.4]);
        let rule = ColumnRule::custom(|values: &ColumnValues, _column: &str| {
            let numeric = values.as_f64().unwrap_or_default();
            Ok(EncodedColumn {
                codes: numeric.iter().map(|&x| usize::from(x > 0.5)).collect(),
                labels: Some(LabelMap::from([(0, Label::from("low")), (1, Label::from("high"))])),
            })
        });
        let data = discretize_data(&frame, &spec(vec![("t", rule)])).unwrap();
        assert_eq!(column_codes(&data, 0), vec![0, 1, 0]);
        assert_eq!(data.value_names().get(0).unwrap().values[&1], Label::from("high"));
    }

    #[test]
    fn custom_encoder_errors_name_the_column() {
        let frame = frame_with("t", vec![1.0]);
        let rule = ColumnRule::custom(|_: &ColumnValues, _: &str| {
            Err(DiscretizeError::Encoder("bad input".into()))
        });
        let err = discretize_data(&frame, &spec(vec![("t", rule)])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error discretizing column 't': column encoder failed: bad input"
        );

        let short = ColumnRule::custom(|_: &ColumnValues, _: &str| {
            Ok(EncodedColumn {
                codes: vec![],
                labels: None,
            })
        });
        assert!(discretize_data(&frame, &spec(vec![("t", short)])).is_err());
    }

    #[test]
    fn columns_follow_spec_order() {
        let frame = Frame::new()
            .with_column("a", vec![1i64, 0])
            .and_then(|f| f.with_column("b", vec!["y", "x"]))
            .unwrap();
        let data = discretize_data(
            &frame,
            &spec(vec![("b", ColumnRule::unique()), ("a", ColumnRule::keep())]),
        )
        .unwrap();
        assert_eq!(data.column_names(), vec!["b", "a"]);
        assert_eq!(data.matrix().to_dense().row(0).to_owned(), Array1::from(vec![1u8, 1]));
    }

    #[test]
    fn unknown_source_column_is_reported() {
        let frame = frame_with("a", vec![1i64]);
        let err = discretize_data(&frame, &spec(vec![("zzz", ColumnRule::keep())])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error discretizing column 'zzz': column 'zzz' not found in source"
        );
    }

    #[test]
    fn spec_parses_from_json() {
        let spec = spec_from_json(
            r#"{
                "age": {"method": "bin", "bins": [18, 65], "nan_name": "unknown"},
                "city": {"method": "unique"},
                "rooms": {"method": "keep"}
            }"#,
        )
        .unwrap();
        assert_eq!(spec.keys().collect::<Vec<_>>(), vec!["age", "city", "rooms"]);
        assert!(matches!(
            &spec["age"],
            ColumnRule::Bin { bins: Some(b), nan_name: Some(n), .. }
                if b == &vec![18.0, 65.0] && n == "unknown"
        ));
        assert_eq!(spec["city"].method_name(), "unique");
        assert!(spec_from_json(r#"{"x": {"method": "explode"}}"#).is_err());
    }
}
