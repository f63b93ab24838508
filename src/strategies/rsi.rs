use crate::indicators;
use crate::models::*;
use crate::param_utils::{get_param_f64, get_param_usize};
use crate::strategy_utils::{closes, format_level, SignalBook};

pub struct RSIStrategy {
    period: usize,
    oversold_level: f64,
    overbought_level: f64,
}

impl RSIStrategy {
    pub fn new(parameters: &StrategyParameters) -> Self {
        Self {
            period: get_param_usize(parameters, "period", 14).max(1),
            oversold_level: get_param_f64(parameters, "oversold", 30.0),
            overbought_level: get_param_f64(parameters, "overbought", 70.0),
        }
    }
}

impl super::Strategy for RSIStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Rsi
    }

    fn get_min_data_points(&self) -> usize {
        self.period + 2
    }

    fn generate_signals(&self, bars: &[PriceBar]) -> Vec<Signal> {
        if bars.len() < self.get_min_data_points() {
            return Vec::new();
        }

        let rsi = indicators::calculate_rsi(&closes(bars), self.period);

        let mut book = SignalBook::new();
        for (i, bar) in bars.iter().enumerate().skip(1) {
            let (Some(prev_rsi), Some(current_rsi)) = (rsi[i - 1], rsi[i]) else {
                continue;
            };

            // Both legs trigger on an upward cross: entry out of oversold, exit into overbought.
            if book.is_flat() && prev_rsi <= self.oversold_level && current_rsi > self.oversold_level
            {
                book.buy(
                    bar,
                    format!(
                        "RSI crossed above {} (oversold)",
                        format_level(self.oversold_level)
                    ),
                );
            } else if book.is_long()
                && prev_rsi <= self.overbought_level
                && current_rsi > self.overbought_level
            {
                book.sell(
                    bar,
                    format!(
                        "RSI crossed above {} (overbought)",
                        format_level(self.overbought_level)
                    ),
                );
            }
        }

        book.into_signals()
    }
}
