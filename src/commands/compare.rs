use crate::backtester::{BacktestJob, Backtester};
use crate::commands::price_data::{load_price_file, resolve_symbol, window_bars, write_json};
use crate::config::BacktestSettings;
use crate::models::{BacktestConfig, BacktestReport, BacktestSummary, PriceBar, StrategyKind};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use std::fmt::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub data_file: PathBuf,
    pub symbol: Option<String>,
    pub initial_capital: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub output: Option<PathBuf>,
}

/// Every catalog strategy with default parameters, in catalog order.
pub fn build_jobs(symbol: &str, initial_capital: f64, bars: &[PriceBar]) -> Vec<BacktestJob> {
    StrategyKind::ALL
        .iter()
        .map(|kind| BacktestJob {
            config: BacktestConfig::new(symbol, kind.as_str()).with_capital(initial_capital),
            bars: bars.to_vec(),
        })
        .collect()
}

/// Best total return first; ties keep catalog order.
pub fn rank_summaries(reports: &[BacktestReport]) -> Vec<BacktestSummary> {
    let mut summaries: Vec<BacktestSummary> = reports.iter().map(BacktestSummary::from).collect();
    summaries.sort_by(|a, b| b.total_return_percent.total_cmp(&a.total_return_percent));
    summaries
}

pub fn format_summary_table(summaries: &[BacktestSummary]) -> Result<String, fmt::Error> {
    let mut table = String::new();
    writeln!(
        table,
        "{:<4} {:<16} {:>10} {:>8} {:>10} {:>9} {:>7}",
        "rank", "strategy", "return %", "sharpe", "drawdown %", "win %", "trades"
    )?;
    for (rank, summary) in summaries.iter().enumerate() {
        writeln!(
            table,
            "{:<4} {:<16} {:>10.2} {:>8.2} {:>10.2} {:>9.2} {:>7}",
            rank + 1,
            summary.strategy.as_str(),
            summary.total_return_percent,
            summary.sharpe_ratio,
            summary.max_drawdown,
            summary.win_rate,
            summary.total_trades
        )?;
    }
    Ok(table)
}

pub fn run(request: &CompareRequest, settings: &BacktestSettings) -> Result<()> {
    let symbol = resolve_symbol(request.symbol.as_deref(), &request.data_file)?;
    let bars = load_price_file(&request.data_file)?;
    let bars = window_bars(&bars, request.start_date, request.end_date)?;
    let initial_capital = request.initial_capital.unwrap_or(settings.initial_capital);

    let jobs = build_jobs(&symbol, initial_capital, &bars);
    info!(
        "Comparing {} strategies on {} over {} bars",
        jobs.len(),
        symbol,
        bars.len()
    );

    let reports = Backtester::run_batch_with_threads(&jobs, settings.threads)
        .into_iter()
        .zip(&jobs)
        .map(|(result, job)| {
            result.with_context(|| format!("Backtest of {} failed", job.config.strategy))
        })
        .collect::<Result<Vec<_>>>()?;

    let summaries = rank_summaries(&reports);
    let table = format_summary_table(&summaries).context("Failed to format summary table")?;
    print!("{}", table);

    if let Some(output) = request.output.as_deref() {
        write_json(&summaries, Some(output))?;
    }
    Ok(())
}
