use crate::indicators;
use crate::models::*;
use crate::param_utils::{get_param_f64, get_param_usize};
use crate::strategy_utils::{closes, SignalBook};

pub struct BollingerBandsStrategy {
    period: usize,
    std_dev: f64,
}

impl BollingerBandsStrategy {
    pub fn new(parameters: &StrategyParameters) -> Self {
        Self {
            period: get_param_usize(parameters, "period", 20).max(1),
            std_dev: get_param_f64(parameters, "std_dev", 2.0),
        }
    }
}

impl super::Strategy for BollingerBandsStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BollingerBands
    }

    fn get_min_data_points(&self) -> usize {
        self.period
    }

    fn generate_signals(&self, bars: &[PriceBar]) -> Vec<Signal> {
        if bars.len() < self.get_min_data_points() {
            return Vec::new();
        }

        let bands = indicators::calculate_bollinger_bands(&closes(bars), self.period, self.std_dev);

        // Band touches are checked bar by bar, no previous bar involved.
        let mut book = SignalBook::new();
        for (i, bar) in bars.iter().enumerate() {
            let (Some(upper), Some(lower)) = (bands.upper[i], bands.lower[i]) else {
                continue;
            };

            if book.is_flat() && bar.close <= lower {
                book.buy(bar, "Price touched lower Bollinger Band");
            } else if book.is_long() && bar.close >= upper {
                book.sell(bar, "Price touched upper Bollinger Band");
            }
        }

        book.into_signals()
    }
}
