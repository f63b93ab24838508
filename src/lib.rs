pub mod backtester;
pub mod candle_utils;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod models;
pub mod param_utils;
pub mod performance;
pub mod strategy;
pub mod strategy_utils;
