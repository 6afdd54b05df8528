//! Daily percentage returns from close prices.

use crate::types::{DailyReturn, PriceBar};

/// Compute close-to-close percentage returns.
///
/// Bars are sorted by date first, so callers may pass them in any order.
/// For `n` bars the result has `n - 1` entries; entry `i` is dated on the
/// later bar of the gap and equals `(c[i] - c[i-1]) / c[i-1] * 100`.
/// A gap touching a non-positive or non-finite close yields `None`.
pub fn compute_returns(bars: &[PriceBar]) -> Vec<DailyReturn> {
    if bars.len() < 2 {
        return vec![];
    }

    let mut sorted: Vec<&PriceBar> = bars.iter().collect();
    sorted.sort_by_key(|b| b.date);

    sorted
        .windows(2)
        .map(|w| {
            let (prev, curr) = (w[0], w[1]);
            let pct_return = if prev.has_valid_close() && curr.has_valid_close() {
                Some((curr.close - prev.close) / prev.close * 100.0)
            } else {
                None
            };
            DailyReturn {
                date: curr.date,
                close: curr.close,
                pct_return,
            }
        })
        .collect()
}

/// The numeric returns only, undefined gaps removed.
pub fn defined_returns(returns: &[DailyReturn]) -> Vec<f64> {
    returns.iter().filter_map(|r| r.pct_return).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close,
            close,
            close,
            close,
            1000,
        )
    }

    #[test]
    fn test_returns_length_and_values() {
        let bars = vec![bar(1, 100.0), bar(2, 110.0), bar(3, 99.0)];
        let returns = compute_returns(&bars);

        assert_eq!(returns.len(), 2);
        assert!((returns[0].pct_return.unwrap() - 10.0).abs() < 1e-12);
        assert!((returns[1].pct_return.unwrap() - -10.0).abs() < 1e-12);
        assert_eq!(returns[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let bars = vec![bar(3, 121.0), bar(1, 100.0), bar(2, 110.0)];
        let returns = compute_returns(&bars);

        assert_eq!(returns[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!((returns[0].pct_return.unwrap() - 10.0).abs() < 1e-12);
        assert!((returns[1].pct_return.unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_close_is_undefined() {
        let bars = vec![bar(1, 100.0), bar(2, 0.0), bar(3, 50.0), bar(4, 55.0)];
        let returns = compute_returns(&bars);

        assert_eq!(returns.len(), 3);
        assert!(returns[0].pct_return.is_none());
        assert!(returns[1].pct_return.is_none());
        assert!(returns[2].pct_return.is_some());
        assert_eq!(defined_returns(&returns).len(), 1);
    }

    #[test]
    fn test_short_series() {
        assert!(compute_returns(&[]).is_empty());
        assert!(compute_returns(&[bar(1, 100.0)]).is_empty());
    }
}
