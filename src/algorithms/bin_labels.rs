// src/algorithms/bin_labels.rs

use crate::utils::format_significant;

/// Renders bucket `bin` of a binned column as an interval string.
///
/// Bucket 0 lies below the first cutoff and bucket `cutoffs.len()` above the
/// last. When `quantile` is set the cutoffs are fractions and are shown as
/// percentages. `cutoffs` must not be empty.
pub fn represent_bin(cutoffs: &[f64], bin: usize, quantile: bool) -> String {
    let (scale, suffix) = if quantile { (100.0, "%") } else { (1.0, "") };
    let fmt = |x: f64| format!("{}{}", format_significant(x * scale, 2), suffix);

    if bin == 0 {
        format!("< {}", fmt(cutoffs[0]))
    } else if bin >= cutoffs.len() {
        format!("> {}", fmt(cutoffs[cutoffs.len() - 1]))
    } else {
        format!("{} - {}", fmt(cutoffs[bin - 1]), fmt(cutoffs[bin]))
    }
}
