use thiserror::Error;

/// Configuration failures raised before a backtest starts.
///
/// Insufficient data and arithmetic edge cases never show up here; they are
/// absorbed by the engine and reported as zero or undefined values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown parameter `{name}` for strategy {strategy}")]
    UnknownParameter { strategy: String, name: String },

    #[error("Parameter `{name}` must be within [{min}, {max}] (value: {value})")]
    ParameterOutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Parameter `{name}` must be an integer (value: {value})")]
    NonIntegerParameter { name: String, value: f64 },

    #[error("Parameter `{name}` must be finite")]
    NonFiniteParameter { name: String },

    #[error("Initial capital must be positive and finite (value: {0})")]
    InvalidCapital(f64),

    #[error("Price series must be strictly ascending by date (violated at bar {index})")]
    UnsortedPriceSeries { index: usize },
}

