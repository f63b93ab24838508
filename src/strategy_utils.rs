use crate::indicators::IndicatorSeries;
use crate::models::{PriceBar, Signal, SignalAction};

/// Collects signals while tracking the local flat/long flag.
///
/// Buys are only accepted while flat and sells only while long, so the
/// resulting sequence always alternates starting with a buy.
#[derive(Debug, Default)]
pub struct SignalBook {
    long: bool,
    signals: Vec<Signal>,
}

impl SignalBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        !self.long
    }

    pub fn is_long(&self) -> bool {
        self.long
    }

    pub fn buy(&mut self, bar: &PriceBar, rationale: impl Into<String>) {
        if self.long {
            return;
        }
        self.signals.push(signal_at(bar, SignalAction::Buy, rationale));
        self.long = true;
    }

    pub fn sell(&mut self, bar: &PriceBar, rationale: impl Into<String>) {
        if !self.long {
            return;
        }
        self.signals.push(signal_at(bar, SignalAction::Sell, rationale));
        self.long = false;
    }

    pub fn into_signals(self) -> Vec<Signal> {
        self.signals
    }
}

/// Create a signal priced at the bar's close
pub fn signal_at(bar: &PriceBar, action: SignalAction, rationale: impl Into<String>) -> Signal {
    Signal {
        date: bar.date,
        action,
        price: bar.close,
        rationale: rationale.into(),
    }
}

pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|bar| bar.close).collect()
}

/// Values of two series at `index - 1` and `index`, if all four are defined.
pub fn paired_values(
    first: &IndicatorSeries,
    second: &IndicatorSeries,
    index: usize,
) -> Option<((f64, f64), (f64, f64))> {
    if index == 0 {
        return None;
    }
    let prev = (first.get(index - 1).copied()??, second.get(index - 1).copied()??);
    let curr = (first.get(index).copied()??, second.get(index).copied()??);
    Some((prev, curr))
}

/// `a` moved from at-or-below `b` to strictly above it.
pub fn crossed_above(prev: (f64, f64), curr: (f64, f64)) -> bool {
    prev.0 <= prev.1 && curr.0 > curr.1
}

/// `a` moved from at-or-above `b` to strictly below it.
pub fn crossed_below(prev: (f64, f64), curr: (f64, f64)) -> bool {
    prev.0 >= prev.1 && curr.0 < curr.1
}

/// Format a level without a trailing `.0` for whole numbers.
pub fn format_level(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    #[test]
    fn signal_book_rejects_out_of_state_actions() {
        let mut book = SignalBook::new();
        book.sell(&bar(1, 10.0), "ignored");
        book.buy(&bar(2, 11.0), "entry");
        book.buy(&bar(3, 12.0), "ignored");
        book.sell(&bar(4, 13.0), "exit");
        book.sell(&bar(5, 14.0), "ignored");

        let signals = book.into_signals();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].action, SignalAction::Buy);
        assert_eq!(signals[0].price, 11.0);
        assert_eq!(signals[1].action, SignalAction::Sell);
        assert_eq!(signals[1].rationale, "exit");
    }

    #[test]
    fn crossover_requires_transition() {
        assert!(crossed_above((1.0, 1.0), (2.0, 1.0)));
        assert!(!crossed_above((2.0, 1.0), (3.0, 1.0)));
        assert!(crossed_below((1.0, 1.0), (0.5, 1.0)));
        assert!(!crossed_below((0.5, 1.0), (0.4, 1.0)));
    }

    #[test]
    fn paired_values_requires_both_indices_defined() {
        let a = vec![None, Some(1.0), Some(2.0)];
        let b = vec![Some(1.0), Some(1.0), Some(1.0)];
        assert!(paired_values(&a, &b, 0).is_none());
        assert!(paired_values(&a, &b, 1).is_none());
        assert_eq!(paired_values(&a, &b, 2), Some(((1.0, 1.0), (2.0, 1.0))));
    }

    #[test]
    fn levels_render_like_integers_when_whole() {
        assert_eq!(format_level(30.0), "30");
        assert_eq!(format_level(2.5), "2.5");
    }
}
