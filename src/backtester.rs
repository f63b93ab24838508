use crate::candle_utils::{ensure_strictly_ascending, normalize_ticker_symbol};
use crate::engine::TradeExecutor;
use crate::error::BacktestError;
use crate::models::*;
use crate::param_utils::resolve_parameters;
use crate::performance::{round_to_cents, PerformanceCalculator};
use crate::strategy::{create_strategy, strategy_info};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::time::Instant;

/// One independent unit of work for [`Backtester::run_batch`].
#[derive(Debug, Clone)]
pub struct BacktestJob {
    pub config: BacktestConfig,
    pub bars: Vec<PriceBar>,
}

/// Configuration resolved and validated, ready to dispatch.
struct ResolvedRun {
    kind: StrategyKind,
    info: StrategyInfo,
    parameters: StrategyParameters,
    symbol: String,
    initial_capital: f64,
}

pub struct Backtester;

impl Backtester {
    /// Run one backtest. Pure in `(config, bars)`: the same inputs always give the same report.
    pub fn run(config: &BacktestConfig, bars: &[PriceBar]) -> Result<BacktestReport, BacktestError> {
        let started = Instant::now();
        let resolved = Self::resolve(config, bars)?;
        info!(
            "Backtesting {} with {} over {} bars",
            resolved.symbol,
            resolved.kind,
            bars.len()
        );

        let signals = Self::generate(&resolved, bars);
        let report = Self::simulate_and_score(resolved, bars, signals);

        info!(
            "Finished {} {}: {} trades, return {:.2}% in {:?}",
            report.symbol,
            report.strategy,
            report.trades.len(),
            report.performance.total_return_percent,
            started.elapsed()
        );
        Ok(report)
    }

    /// Run independent jobs in parallel; results come back in job order.
    pub fn run_batch(jobs: &[BacktestJob]) -> Vec<Result<BacktestReport, BacktestError>> {
        jobs.par_iter()
            .map(|job| Self::run(&job.config, &job.bars))
            .collect()
    }

    /// Same as [`Backtester::run_batch`] on a dedicated pool of `threads` workers.
    pub fn run_batch_with_threads(
        jobs: &[BacktestJob],
        threads: Option<usize>,
    ) -> Vec<Result<BacktestReport, BacktestError>> {
        let Some(threads) = threads else {
            return Self::run_batch(jobs);
        };

        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| Self::run_batch(jobs)),
            Err(err) => {
                warn!(
                    "Failed to build a {}-thread pool ({}); using the global pool",
                    threads, err
                );
                Self::run_batch(jobs)
            }
        }
    }

    fn resolve(config: &BacktestConfig, bars: &[PriceBar]) -> Result<ResolvedRun, BacktestError> {
        let kind: StrategyKind = config.strategy.parse()?;
        if !(config.initial_capital.is_finite() && config.initial_capital > 0.0) {
            return Err(BacktestError::InvalidCapital(config.initial_capital));
        }

        let info = strategy_info(kind);
        let parameters = resolve_parameters(&info, &config.parameters)?;
        ensure_strictly_ascending(bars)?;

        Ok(ResolvedRun {
            kind,
            info,
            parameters,
            symbol: normalize_ticker_symbol(&config.symbol).unwrap_or_default(),
            initial_capital: config.initial_capital,
        })
    }

    fn generate(resolved: &ResolvedRun, bars: &[PriceBar]) -> Vec<Signal> {
        let strategy = create_strategy(resolved.kind, &resolved.parameters);
        let min_data_points = strategy.get_min_data_points();
        if bars.len() < min_data_points {
            debug!(
                "{} needs {} bars but only {} were supplied; no signals generated",
                resolved.kind,
                min_data_points,
                bars.len()
            );
        }

        let signals = strategy.generate_signals(bars);
        debug!("{} generated {} signals", resolved.kind, signals.len());
        signals
    }

    fn simulate_and_score(
        resolved: ResolvedRun,
        bars: &[PriceBar],
        signals: Vec<Signal>,
    ) -> BacktestReport {
        let execution = TradeExecutor::new(resolved.initial_capital).execute(&signals, bars);
        let performance = PerformanceCalculator::calculate_performance(
            &execution.trades,
            &execution.equity_curve,
            resolved.initial_capital,
            bars.len(),
        );

        let final_value = execution
            .equity_curve
            .last()
            .map(|point| point.value)
            .unwrap_or(resolved.initial_capital);

        let equity_curve = execution
            .equity_curve
            .into_iter()
            .map(|point| EquityPoint {
                value: round_to_cents(point.value),
                ..point
            })
            .collect();

        BacktestReport {
            symbol: resolved.symbol,
            strategy: resolved.kind,
            strategy_name: resolved.info.name,
            parameters: resolved.parameters,
            initial_capital: resolved.initial_capital,
            final_value: round_to_cents(final_value),
            performance: performance.rounded(),
            trades: execution.trades,
            equity_curve,
            start_date: bars.first().map(|bar| bar.date),
            end_date: bars.last().map(|bar| bar.date),
            trading_days: bars.len(),
        }
    }
}
