use crate::backtester::Backtester;
use crate::commands::price_data::{load_price_file, resolve_symbol, window_bars, write_json};
use crate::config::BacktestSettings;
use crate::models::{BacktestConfig, BacktestReport, PriceBar};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BacktestRequest {
    pub strategy: String,
    pub data_file: PathBuf,
    pub symbol: Option<String>,
    pub initial_capital: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub parameters: Vec<(String, f64)>,
    pub output: Option<PathBuf>,
}

/// Parse a `name=value` strategy parameter override.
pub fn parse_parameter_override(raw: &str) -> Result<(String, f64)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Parameter override must look like name=value (got {})", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Parameter override is missing a name (got {})", raw));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Parameter {} must be a number (got {})", name, value.trim()))?;
    Ok((name.to_string(), value))
}

pub fn build_config(
    request: &BacktestRequest,
    settings: &BacktestSettings,
) -> Result<BacktestConfig> {
    let symbol = resolve_symbol(request.symbol.as_deref(), &request.data_file)?;
    let mut config = BacktestConfig::new(symbol, request.strategy.clone())
        .with_capital(request.initial_capital.unwrap_or(settings.initial_capital));
    config.start_date = request.start_date;
    config.end_date = request.end_date;
    for (name, value) in &request.parameters {
        config = config.with_parameter(name, *value);
    }
    Ok(config)
}

/// Window `bars` to the config's dates and run a single backtest.
pub fn run_on_bars(config: &BacktestConfig, bars: &[PriceBar]) -> Result<BacktestReport> {
    let window = window_bars(bars, config.start_date, config.end_date)?;
    let report = Backtester::run(config, &window)
        .with_context(|| format!("Backtest of {} on {} failed", config.strategy, config.symbol))?;
    Ok(report)
}

pub fn run(request: &BacktestRequest, settings: &BacktestSettings) -> Result<()> {
    let config = build_config(request, settings)?;
    info!(
        "Running {} on {} from {}",
        config.strategy,
        config.symbol,
        request.data_file.display()
    );

    let bars = load_price_file(&request.data_file)?;
    let report = run_on_bars(&config, &bars)?;
    info!(
        "{} {}: final value {:.2}, {} trades, sharpe {:.2}",
        report.symbol,
        report.strategy,
        report.final_value,
        report.trades.len(),
        report.performance.sharpe_ratio
    );

    write_json(&report, request.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(strategy: &str) -> BacktestRequest {
        BacktestRequest {
            strategy: strategy.to_string(),
            data_file: PathBuf::from("prices/infy.json"),
            symbol: None,
            initial_capital: None,
            start_date: None,
            end_date: None,
            parameters: Vec::new(),
            output: None,
        }
    }

    #[test]
    fn parses_parameter_overrides() {
        assert_eq!(
            parse_parameter_override("period=21").unwrap(),
            ("period".to_string(), 21.0)
        );
        assert_eq!(
            parse_parameter_override(" std_dev = 2.5 ").unwrap(),
            ("std_dev".to_string(), 2.5)
        );
        assert!(parse_parameter_override("period").is_err());
        assert!(parse_parameter_override("=3").is_err());
        assert!(parse_parameter_override("period=fast").is_err());
    }

    #[test]
    fn config_takes_settings_capital_unless_overridden() {
        let settings = BacktestSettings {
            initial_capital: 25_000.0,
            threads: None,
        };
        let mut req = request("rsi");
        req.parameters = vec![("period".to_string(), 10.0)];

        let config = build_config(&req, &settings).unwrap();
        assert_eq!(config.symbol, "INFY");
        assert_eq!(config.initial_capital, 25_000.0);
        assert_eq!(config.parameters.get("period"), Some(&10.0));

        req.initial_capital = Some(5_000.0);
        assert_eq!(build_config(&req, &settings).unwrap().initial_capital, 5_000.0);
    }

    #[test]
    fn run_on_bars_applies_date_window() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let bars: Vec<PriceBar> = (0..10)
            .map(|i| PriceBar {
                date: start + Duration::days(i),
                open: 100.0,
                high: 100.0,
                low: 100.0,
                close: 100.0,
                volume: 0.0,
            })
            .collect();

        let mut req = request("momentum");
        req.start_date = Some(start + Duration::days(2));
        req.end_date = Some(start + Duration::days(5));
        let config = build_config(&req, &BacktestSettings::default()).unwrap();

        let report = run_on_bars(&config, &bars).unwrap();
        assert_eq!(report.trading_days, 4);
        assert_eq!(report.start_date, req.start_date);
        assert_eq!(report.end_date, req.end_date);
    }

    #[test]
    fn configuration_errors_surface_with_context() {
        let config = build_config(&request("ichimoku"), &BacktestSettings::default()).unwrap();
        let err = run_on_bars(&config, &[]).unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown strategy: ichimoku"));
    }
}
