use crate::indicators;
use crate::models::*;
use crate::param_utils::get_param_usize;
use crate::strategy_utils::{closes, crossed_above, crossed_below, paired_values, SignalBook};

pub struct MACDStrategy {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl MACDStrategy {
    pub fn new(parameters: &StrategyParameters) -> Self {
        Self {
            fast_period: get_param_usize(parameters, "fast_period", 12).max(1),
            slow_period: get_param_usize(parameters, "slow_period", 26).max(1),
            signal_period: get_param_usize(parameters, "signal_period", 9).max(1),
        }
    }
}

impl super::Strategy for MACDStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Macd
    }

    fn get_min_data_points(&self) -> usize {
        self.fast_period.max(self.slow_period) + self.signal_period
    }

    fn generate_signals(&self, bars: &[PriceBar]) -> Vec<Signal> {
        if bars.len() < self.get_min_data_points() {
            return Vec::new();
        }

        let output = indicators::calculate_macd(
            &closes(bars),
            self.fast_period,
            self.slow_period,
            self.signal_period,
        );

        let mut book = SignalBook::new();
        for (i, bar) in bars.iter().enumerate().skip(1) {
            let Some((prev, curr)) = paired_values(&output.macd, &output.signal, i) else {
                continue;
            };

            if book.is_flat() && crossed_above(prev, curr) {
                book.buy(bar, "MACD crossed above signal line");
            } else if book.is_long() && crossed_below(prev, curr) {
                book.sell(bar, "MACD crossed below signal line");
            }
        }

        book.into_signals()
    }
}
