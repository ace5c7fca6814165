// src/utils.rs
//! Numeric helpers shared by the discretizers.

use crate::core::{DiscretizeError, Result};

/// Formats `x` with `precision` significant digits, like C's `%g`.
///
/// Uses scientific notation when the decimal exponent is below -4 or at
/// least `precision`; trailing zeros are removed in both forms.
pub fn format_significant(x: f64, precision: usize) -> String {
    let precision = precision.max(1);
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }

    // Round to the requested digits first; rounding can bump the exponent (9.96 -> 1e1).
    let sci = format!("{:.*e}", precision - 1, x);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, x)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Quantiles of the non-NaN values using linear interpolation between
/// closest ranks.
pub fn quantiles(values: &[f64], qs: &[f64]) -> Result<Vec<f64>> {
    if let Some(&bad) = qs.iter().find(|q| !(0.0..=1.0).contains(*q)) {
        return Err(DiscretizeError::InvalidQuantile(bad));
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return Err(DiscretizeError::EmptyColumn);
    }
    sorted.sort_by(f64::total_cmp);

    let last = (sorted.len() - 1) as f64;
    Ok(qs
        .iter()
        .map(|&q| {
            let pos = q * last;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(5.1, "5.1")]
    #[case(12.34, "12")]
    #[case(25.0, "25")]
    #[case(0.5, "0.5")]
    #[case(123.4, "1.2e+02")]
    #[case(0.0001234, "0.00012")]
    #[case(0.00001234, "1.2e-05")]
    #[case(9.96, "10")]
    #[case(-3.0, "-3")]
    #[case(0.0, "0")]
    fn formats_like_two_digit_g(#[case] x: f64, #[case] expected: &str) {
        assert_eq!(format_significant(x, 2), expected);
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let values = [4.0, 1.0, f64::NAN, 3.0, 2.0];
        let q = quantiles(&values, &[0.0, 0.25, 0.5, 1.0]).unwrap();
        assert_abs_diff_eq!(q[0], 1.0);
        assert_abs_diff_eq!(q[1], 1.75);
        assert_abs_diff_eq!(q[2], 2.5);
        assert_abs_diff_eq!(q[3], 4.0);
    }

    #[test]
    fn quantiles_reject_bad_input() {
        assert!(matches!(
            quantiles(&[1.0], &[1.5]),
            Err(DiscretizeError::InvalidQuantile(q)) if q == 1.5
        ));
        assert!(matches!(
            quantiles(&[f64::NAN], &[0.5]),
            Err(DiscretizeError::EmptyColumn)
        ));
    }
}
