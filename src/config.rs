use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::env;

use crate::models::DEFAULT_INITIAL_CAPITAL;

const SETTINGS_PREFIX: &str = "BACKTEST_";

/// Runtime settings for the command line front end.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    /// Capital used when a run does not specify one.
    pub initial_capital: f64,
    /// Worker threads for batch runs; `None` keeps rayon's default pool.
    pub threads: Option<usize>,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            threads: None,
        }
    }
}

impl BacktestSettings {
    pub fn from_settings_map(settings: &HashMap<String, String>) -> Result<Self> {
        let defaults = Self::default();
        let initial_capital = match optional_setting(settings, "BACKTEST_INITIAL_CAPITAL") {
            Some(_) => require_setting_positive_f64(settings, "BACKTEST_INITIAL_CAPITAL")?,
            None => defaults.initial_capital,
        };

        let threads = match optional_setting(settings, "BACKTEST_THREADS") {
            Some(_) => Some(require_setting_usize(settings, "BACKTEST_THREADS", 1)?),
            None => defaults.threads,
        };

        Ok(Self {
            initial_capital,
            threads,
        })
    }

    /// Collect every `BACKTEST_*` environment variable and parse it.
    pub fn from_env() -> Result<Self> {
        let settings: HashMap<String, String> = env::vars()
            .filter(|(key, _)| key.starts_with(SETTINGS_PREFIX))
            .collect();
        Self::from_settings_map(&settings)
    }
}

fn optional_setting<'a>(settings: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn require_setting<'a>(settings: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    optional_setting(settings, key).ok_or_else(|| anyhow!("Missing required setting {}", key))
}

fn require_setting_positive_f64(settings: &HashMap<String, String>, key: &str) -> Result<f64> {
    let raw = require_setting(settings, key)?;
    let value = raw
        .parse::<f64>()
        .map_err(|_| anyhow!("Setting {} must be a number (value: {})", key, raw))?;
    if !value.is_finite() {
        return Err(anyhow!("Setting {} must be finite (value: {})", key, raw));
    }
    if value <= 0.0 {
        return Err(anyhow!("Setting {} must be > 0 (value: {})", key, raw));
    }
    Ok(value)
}

fn require_setting_usize(
    settings: &HashMap<String, String>,
    key: &str,
    min: usize,
) -> Result<usize> {
    let raw = require_setting(settings, key)?;
    let value = raw
        .parse::<f64>()
        .map_err(|_| anyhow!("Setting {} must be a number (value: {})", key, raw))?;
    if !value.is_finite() {
        return Err(anyhow!("Setting {} must be finite (value: {})", key, raw));
    }
    if value.fract() != 0.0 {
        return Err(anyhow!(
            "Setting {} must be an integer (value: {})",
            key,
            raw
        ));
    }
    if value < min as f64 {
        return Err(anyhow!(
            "Setting {} must be >= {} (value: {})",
            key,
            min,
            raw
        ));
    }
    Ok(value as usize)
}
