pub mod backtest;
pub mod compare;
pub mod list_strategies;
pub mod price_data;
