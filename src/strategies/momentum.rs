use crate::indicators;
use crate::models::*;
use crate::param_utils::{get_param_f64, get_param_usize};
use crate::strategy_utils::{closes, format_level, SignalBook};

pub struct MomentumStrategy {
    period: usize,
    threshold: f64,
}

impl MomentumStrategy {
    pub fn new(parameters: &StrategyParameters) -> Self {
        Self {
            period: get_param_usize(parameters, "period", 14).max(1),
            threshold: get_param_f64(parameters, "threshold", 2.0),
        }
    }
}

impl super::Strategy for MomentumStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Momentum
    }

    fn get_min_data_points(&self) -> usize {
        // current and previous momentum both need a base `period` bars back
        self.period + 2
    }

    fn generate_signals(&self, bars: &[PriceBar]) -> Vec<Signal> {
        if bars.len() < self.get_min_data_points() {
            return Vec::new();
        }

        let momentum = indicators::calculate_momentum(&closes(bars), self.period);

        let mut book = SignalBook::new();
        for (i, bar) in bars.iter().enumerate().skip(self.period + 1) {
            // zero base prices leave momentum undefined
            let (Some(prev_momentum), Some(current_momentum)) = (momentum[i - 1], momentum[i])
            else {
                continue;
            };

            if book.is_flat() && prev_momentum <= self.threshold && current_momentum > self.threshold
            {
                book.buy(
                    bar,
                    format!("Momentum crossed above {}%", format_level(self.threshold)),
                );
            } else if book.is_long()
                && prev_momentum >= -self.threshold
                && current_momentum < -self.threshold
            {
                book.sell(
                    bar,
                    format!("Momentum crossed below -{}%", format_level(self.threshold)),
                );
            }
        }

        book.into_signals()
    }
}
