use crate::indicators;
use crate::models::*;
use crate::param_utils::get_param_usize;
use crate::strategy_utils::{closes, crossed_above, crossed_below, paired_values, SignalBook};

pub struct SmaCrossoverStrategy {
    short_period: usize,
    long_period: usize,
}

impl SmaCrossoverStrategy {
    pub fn new(parameters: &StrategyParameters) -> Self {
        Self {
            short_period: get_param_usize(parameters, "short_period", 20).max(1),
            long_period: get_param_usize(parameters, "long_period", 50).max(1),
        }
    }
}

impl super::Strategy for SmaCrossoverStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SmaCrossover
    }

    fn get_min_data_points(&self) -> usize {
        self.short_period.max(self.long_period) + 1
    }

    fn generate_signals(&self, bars: &[PriceBar]) -> Vec<Signal> {
        if bars.len() < self.get_min_data_points() {
            return Vec::new();
        }

        let prices = closes(bars);
        let short_sma = indicators::calculate_sma(&prices, self.short_period);
        let long_sma = indicators::calculate_sma(&prices, self.long_period);

        let mut book = SignalBook::new();
        for (i, bar) in bars.iter().enumerate().skip(1) {
            let Some((prev, curr)) = paired_values(&short_sma, &long_sma, i) else {
                continue;
            };

            if book.is_flat() && crossed_above(prev, curr) {
                book.buy(
                    bar,
                    format!(
                        "SMA{} crossed above SMA{}",
                        self.short_period, self.long_period
                    ),
                );
            } else if book.is_long() && crossed_below(prev, curr) {
                book.sell(
                    bar,
                    format!(
                        "SMA{} crossed below SMA{}",
                        self.short_period, self.long_period
                    ),
                );
            }
        }

        book.into_signals()
    }
}
