use crate::error::BacktestError;
use crate::models::PriceBar;
use chrono::NaiveDate;

/// Rejects series whose dates are not strictly increasing.
pub fn ensure_strictly_ascending(bars: &[PriceBar]) -> Result<(), BacktestError> {
    match bars.windows(2).position(|pair| pair[0].date >= pair[1].date) {
        Some(position) => Err(BacktestError::UnsortedPriceSeries {
            index: position + 1,
        }),
        None => Ok(()),
    }
}

/// Sorts bars by date in place, keeping the last bar seen for a duplicated date.
pub fn sort_and_dedup_bars(bars: &mut Vec<PriceBar>) {
    bars.sort_by(|a, b| a.date.cmp(&b.date));
    bars.reverse();
    bars.dedup_by(|later, earlier| later.date == earlier.date);
    bars.reverse();
}

/// Bars with `start <= date <= end`; open bounds are unrestricted.
pub fn filter_bars_by_date_range(
    bars: &[PriceBar],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<PriceBar> {
    bars.iter()
        .filter(|bar| start.map_or(true, |start| bar.date >= start))
        .filter(|bar| end.map_or(true, |end| bar.date <= end))
        .cloned()
        .collect()
}

/// Normalizes a ticker string by trimming whitespace and uppercasing.
pub fn normalize_ticker_symbol(value: &str) -> Option<String> {
    let normalized = value.trim().to_uppercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2021, 5, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn detects_out_of_order_and_duplicate_dates() {
        assert!(ensure_strictly_ascending(&[bar(1, 1.0), bar(2, 1.0)]).is_ok());
        assert_eq!(
            ensure_strictly_ascending(&[bar(1, 1.0), bar(3, 1.0), bar(2, 1.0)]),
            Err(BacktestError::UnsortedPriceSeries { index: 2 })
        );
        assert_eq!(
            ensure_strictly_ascending(&[bar(1, 1.0), bar(1, 2.0)]),
            Err(BacktestError::UnsortedPriceSeries { index: 1 })
        );
    }

    #[test]
    fn sort_and_dedup_keeps_latest_duplicate() {
        let mut bars = vec![bar(3, 3.0), bar(1, 1.0), bar(3, 4.0), bar(2, 2.0)];
        sort_and_dedup_bars(&mut bars);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 4.0]);
        assert!(ensure_strictly_ascending(&bars).is_ok());
    }

    #[test]
    fn filters_inclusive_date_range() {
        let bars = vec![bar(1, 1.0), bar(2, 2.0), bar(3, 3.0), bar(4, 4.0)];
        let window = filter_bars_by_date_range(
            &bars,
            NaiveDate::from_ymd_opt(2021, 5, 2),
            NaiveDate::from_ymd_opt(2021, 5, 3),
        );
        assert_eq!(window.len(), 2);
        assert_eq!(filter_bars_by_date_range(&bars, None, None).len(), 4);
    }

    #[test]
    fn normalizes_symbols() {
        assert_eq!(normalize_ticker_symbol(" reliance.ns "), Some("RELIANCE.NS".to_string()));
        assert_eq!(normalize_ticker_symbol("   "), None);
    }
}
