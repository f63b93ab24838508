use crate::models::*;

pub trait Strategy {
    fn kind(&self) -> StrategyKind;
    /// Bars needed before the generator can emit anything.
    fn get_min_data_points(&self) -> usize;
    fn generate_signals(&self, bars: &[PriceBar]) -> Vec<Signal>;
}

#[path = "strategies/sma_crossover.rs"]
pub mod sma_crossover;

pub use sma_crossover::SmaCrossoverStrategy;

#[path = "strategies/rsi.rs"]
pub mod rsi;

pub use rsi::RSIStrategy;

#[path = "strategies/macd.rs"]
pub mod macd;

pub use macd::MACDStrategy;

#[path = "strategies/bollinger.rs"]
pub mod bollinger;

pub use bollinger::BollingerBandsStrategy;

#[path = "strategies/momentum.rs"]
pub mod momentum;

pub use momentum::MomentumStrategy;

pub fn create_strategy(
    kind: StrategyKind,
    parameters: &StrategyParameters,
) -> Box<dyn Strategy + Send + Sync> {
    match kind {
        StrategyKind::SmaCrossover => Box::new(SmaCrossoverStrategy::new(parameters)),
        StrategyKind::Rsi => Box::new(RSIStrategy::new(parameters)),
        StrategyKind::Macd => Box::new(MACDStrategy::new(parameters)),
        StrategyKind::BollingerBands => Box::new(BollingerBandsStrategy::new(parameters)),
        StrategyKind::Momentum => Box::new(MomentumStrategy::new(parameters)),
    }
}

fn int_param(name: &str, min: f64, max: f64, description: &str) -> StrategyParameter {
    StrategyParameter {
        name: name.to_string(),
        r#type: ParameterType::Int,
        min,
        max,
        description: description.to_string(),
    }
}

fn float_param(name: &str, min: f64, max: f64, description: &str) -> StrategyParameter {
    StrategyParameter {
        name: name.to_string(),
        r#type: ParameterType::Float,
        min,
        max,
        description: description.to_string(),
    }
}

fn defaults(entries: &[(&str, f64)]) -> StrategyParameters {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

/// Static catalog entry for a strategy kind.
pub fn strategy_info(kind: StrategyKind) -> StrategyInfo {
    let (name, description, parameters, default_params) = match kind {
        StrategyKind::SmaCrossover => (
            "SMA Crossover",
            "Buy when short-term SMA crosses above long-term SMA, sell on cross below",
            vec![
                int_param("short_period", 5.0, 50.0, "Short SMA period"),
                int_param("long_period", 20.0, 200.0, "Long SMA period"),
            ],
            defaults(&[("short_period", 20.0), ("long_period", 50.0)]),
        ),
        StrategyKind::Rsi => (
            "RSI Strategy",
            "Buy when RSI recovers from oversold, sell when it breaks into overbought",
            vec![
                int_param("period", 7.0, 28.0, "RSI period"),
                int_param("oversold", 20.0, 40.0, "Oversold threshold"),
                int_param("overbought", 60.0, 80.0, "Overbought threshold"),
            ],
            defaults(&[("period", 14.0), ("oversold", 30.0), ("overbought", 70.0)]),
        ),
        StrategyKind::Macd => (
            "MACD Strategy",
            "Buy on MACD line crossing above signal line, sell on cross below",
            vec![
                int_param("fast_period", 8.0, 16.0, "Fast EMA period"),
                int_param("slow_period", 20.0, 30.0, "Slow EMA period"),
                int_param("signal_period", 6.0, 12.0, "Signal line period"),
            ],
            defaults(&[
                ("fast_period", 12.0),
                ("slow_period", 26.0),
                ("signal_period", 9.0),
            ]),
        ),
        StrategyKind::BollingerBands => (
            "Bollinger Bands",
            "Buy at lower band, sell at upper band",
            vec![
                int_param("period", 10.0, 30.0, "SMA period"),
                float_param("std_dev", 1.5, 3.0, "Standard deviations"),
            ],
            defaults(&[("period", 20.0), ("std_dev", 2.0)]),
        ),
        StrategyKind::Momentum => (
            "Momentum Strategy",
            "Buy when momentum rises above the threshold, sell when it falls below its negative",
            vec![
                int_param("period", 5.0, 30.0, "Momentum period"),
                float_param("threshold", 0.0, 5.0, "Entry threshold %"),
            ],
            defaults(&[("period", 14.0), ("threshold", 2.0)]),
        ),
    };

    StrategyInfo {
        id: kind,
        name: name.to_string(),
        description: description.to_string(),
        parameters,
        default_params,
    }
}

pub fn list_strategies() -> Vec<StrategyInfo> {
    StrategyKind::ALL.into_iter().map(strategy_info).collect()
}
