//! Small numeric helpers shared by the audit engine

/// Clamp `value` into `[min, max]`. NaN collapses to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Median of `values`, NaN when empty.
///
/// Even-length input yields the mean of the two middle values after an
/// ascending sort.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Ratio as a whole percentage (0.256 -> 26)
pub fn pct(ratio: f64) -> i64 {
    (ratio * 100.0).round() as i64
}

/// Round to a whole amount and group thousands with commas (18150.4 -> "18,150")
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        // Even length takes the mean of the two central sorted values
        assert_eq!(median(&[22900.0, 20900.0, 19900.0, 24900.0]), 21900.0);
        assert_eq!(median(&[5.0, 1.0]), 3.0);
    }

    #[test]
    fn test_median_empty_is_nan() {
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.7, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-0.2, 0.0, 1.0), 0.0);
        assert_eq!(clamp(2.5, 0.0, 2.0), 2.0);
        assert_eq!(clamp(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_pct_rounds_to_nearest() {
        assert_eq!(pct(0.6627), 66);
        assert_eq!(pct(0.665), 67);
        assert_eq!(pct(0.0), 0);
    }

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(18150.4), "18,150");
        assert_eq!(format_amount(999.5), "1,000");
        assert_eq!(format_amount(1234567.0), "1,234,567");
        assert_eq!(format_amount(12.0), "12");
        assert_eq!(format_amount(-45000.0), "-45,000");
    }
}
