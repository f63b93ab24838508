use crate::models::*;
use statrs::statistics::Statistics;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub struct PerformanceCalculator;

/// Closed round trips split by outcome. Loss magnitudes are stored as positives.
struct TradeOutcomes {
    wins: Vec<f64>,
    losses: Vec<f64>,
}

impl PerformanceCalculator {
    /// Full-precision metrics; round with [`StrategyPerformance::rounded`] when reporting.
    pub fn calculate_performance(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        initial_capital: f64,
        trading_days: usize,
    ) -> StrategyPerformance {
        if trades.is_empty() {
            return StrategyPerformance::default();
        }

        let final_value = equity_curve
            .last()
            .map(|point| point.value)
            .unwrap_or(initial_capital);
        let total_return = final_value - initial_capital;
        let total_return_percent = if initial_capital > 0.0 {
            total_return / initial_capital * 100.0
        } else {
            0.0
        };

        let annualized_return =
            Self::calculate_annualized_return(initial_capital, final_value, trading_days);
        let max_drawdown = Self::calculate_max_drawdown(equity_curve, initial_capital);

        let daily_returns = Self::daily_returns(equity_curve);
        let volatility = Self::calculate_volatility(&daily_returns);
        let sharpe_ratio = Self::calculate_sharpe_ratio(&daily_returns, volatility);

        let outcomes = Self::pair_round_trips(trades);
        let winning_trades = outcomes.wins.len() as u32;
        let losing_trades = outcomes.losses.len() as u32;
        let total_trades = winning_trades + losing_trades;
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let gross_loss: f64 = outcomes.losses.iter().sum();
        let profit_factor = if !outcomes.losses.is_empty() && gross_loss > 0.0 {
            outcomes.wins.iter().sum::<f64>() / gross_loss
        } else {
            0.0
        };

        StrategyPerformance {
            total_return,
            total_return_percent,
            annualized_return,
            max_drawdown,
            sharpe_ratio,
            volatility,
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            avg_win: Self::average(&outcomes.wins),
            avg_loss: Self::average(&outcomes.losses),
            profit_factor,
        }
    }

    fn calculate_annualized_return(
        initial_capital: f64,
        final_value: f64,
        trading_days: usize,
    ) -> f64 {
        let years = trading_days as f64 / TRADING_DAYS_PER_YEAR;
        if years <= 0.0 || final_value <= 0.0 || initial_capital <= 0.0 {
            return 0.0;
        }

        ((final_value / initial_capital).powf(1.0 / years) - 1.0) * 100.0
    }

    /// Largest percentage decline from the running peak, which starts at the initial capital.
    pub fn calculate_max_drawdown(equity_curve: &[EquityPoint], initial_capital: f64) -> f64 {
        let mut peak_value = initial_capital;
        let mut max_drawdown_percent = 0.0_f64;

        for point in equity_curve {
            if point.value > peak_value {
                peak_value = point.value;
            }
            if peak_value > 0.0 {
                let drawdown_percent = (peak_value - point.value) / peak_value * 100.0;
                max_drawdown_percent = max_drawdown_percent.max(drawdown_percent);
            }
        }

        max_drawdown_percent
    }

    fn daily_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
        equity_curve
            .windows(2)
            .filter(|window| window[0].value > 0.0)
            .map(|window| (window[1].value - window[0].value) / window[0].value)
            .collect()
    }

    /// Annualized population standard deviation of daily returns, in percent.
    fn calculate_volatility(daily_returns: &[f64]) -> f64 {
        if daily_returns.is_empty() {
            return 0.0;
        }
        let std_dev = daily_returns.iter().population_std_dev();
        if !std_dev.is_finite() {
            return 0.0;
        }
        std_dev * TRADING_DAYS_PER_YEAR.sqrt() * 100.0
    }

    fn calculate_sharpe_ratio(daily_returns: &[f64], volatility: f64) -> f64 {
        if daily_returns.is_empty() || volatility <= 0.0 {
            return 0.0;
        }
        let annualized_return = daily_returns.iter().mean() * TRADING_DAYS_PER_YEAR;
        annualized_return / (volatility / 100.0)
    }

    /// Walk the ledger as adjacent (buy, sell) pairs; a trailing open buy is skipped.
    fn pair_round_trips(trades: &[Trade]) -> TradeOutcomes {
        let mut outcomes = TradeOutcomes {
            wins: Vec::new(),
            losses: Vec::new(),
        };

        for pair in trades.chunks_exact(2) {
            let (entry, exit) = (&pair[0], &pair[1]);
            if entry.action != SignalAction::Buy || exit.action != SignalAction::Sell {
                continue;
            }
            let pnl = exit.value - entry.value;
            if pnl > 0.0 {
                outcomes.wins.push(pnl);
            } else {
                outcomes.losses.push(pnl.abs());
            }
        }

        outcomes
    }

    fn average(values: &[f64]) -> f64 {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }
}

pub fn round_to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

impl StrategyPerformance {
    pub fn rounded(&self) -> Self {
        Self {
            total_return: round_to_cents(self.total_return),
            total_return_percent: round_to_cents(self.total_return_percent),
            annualized_return: round_to_cents(self.annualized_return),
            max_drawdown: round_to_cents(self.max_drawdown),
            sharpe_ratio: round_to_cents(self.sharpe_ratio),
            volatility: round_to_cents(self.volatility),
            total_trades: self.total_trades,
            winning_trades: self.winning_trades,
            losing_trades: self.losing_trades,
            win_rate: round_to_cents(self.win_rate),
            avg_win: round_to_cents(self.avg_win),
            avg_loss: round_to_cents(self.avg_loss),
            profit_factor: round_to_cents(self.profit_factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        let start = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| EquityPoint {
                date: start + Duration::days(i as i64),
                value,
                price: 100.0,
            })
            .collect()
    }

    fn trade(action: SignalAction, price: f64, quantity: u64) -> Trade {
        Trade {
            date: NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
            action,
            price,
            quantity,
            value: price * quantity as f64,
            rationale: String::new(),
            portfolio_value: 0.0,
        }
    }

    #[test]
    fn no_trades_means_all_zero_metrics() {
        let performance = PerformanceCalculator::calculate_performance(
            &[],
            &curve(&[100_000.0, 120_000.0, 90_000.0]),
            100_000.0,
            3,
        );
        assert_eq!(performance, StrategyPerformance::default());
        assert_eq!(performance.total_return, 0.0);
        assert_eq!(performance.sharpe_ratio, 0.0);
        assert_eq!(performance.win_rate, 0.0);
        assert_eq!(performance.total_trades, 0);
    }

    #[test]
    fn max_drawdown_tracks_running_peak() {
        let drawdown = PerformanceCalculator::calculate_max_drawdown(
            &curve(&[100_000.0, 110_000.0, 95_000.0]),
            100_000.0,
        );
        assert!((drawdown - 15_000.0 / 110_000.0 * 100.0).abs() < 1e-9);
        assert_eq!(round_to_cents(drawdown), 13.64);
    }

    #[test]
    fn max_drawdown_is_zero_on_rising_curve() {
        let drawdown = PerformanceCalculator::calculate_max_drawdown(
            &curve(&[100.0, 101.0, 102.0]),
            100.0,
        );
        assert_eq!(drawdown, 0.0);
    }

    #[test]
    fn computes_trade_statistics_from_round_trips() {
        let trades = vec![
            trade(SignalAction::Buy, 100.0, 10),
            trade(SignalAction::Sell, 110.0, 10),
            trade(SignalAction::Buy, 110.0, 10),
            trade(SignalAction::Sell, 105.0, 10),
            trade(SignalAction::Buy, 105.0, 10),
            trade(SignalAction::Sell, 125.0, 10),
            // still open, excluded from pair statistics
            trade(SignalAction::Buy, 125.0, 10),
        ];
        let performance = PerformanceCalculator::calculate_performance(
            &trades,
            &curve(&[1_000.0, 1_100.0, 1_050.0, 1_250.0]),
            1_000.0,
            4,
        );

        assert_eq!(performance.total_trades, 3);
        assert_eq!(performance.winning_trades, 2);
        assert_eq!(performance.losing_trades, 1);
        assert!((performance.win_rate - 200.0 / 3.0).abs() < 1e-9);
        assert!((performance.avg_win - 150.0).abs() < 1e-9);
        assert!((performance.avg_loss - 50.0).abs() < 1e-9);
        assert!((performance.profit_factor - 6.0).abs() < 1e-9);
        assert!((performance.total_return - 250.0).abs() < 1e-9);
        assert!((performance.total_return_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn break_even_round_trip_counts_as_loss_without_profit_factor() {
        let trades = vec![
            trade(SignalAction::Buy, 100.0, 10),
            trade(SignalAction::Sell, 100.0, 10),
        ];
        let performance = PerformanceCalculator::calculate_performance(
            &trades,
            &curve(&[1_000.0, 1_000.0]),
            1_000.0,
            2,
        );
        assert_eq!(performance.losing_trades, 1);
        assert_eq!(performance.win_rate, 0.0);
        assert_eq!(performance.profit_factor, 0.0);
        assert_eq!(performance.volatility, 0.0);
        assert_eq!(performance.sharpe_ratio, 0.0);
    }

    #[test]
    fn volatility_and_sharpe_use_population_statistics() {
        let trades = vec![trade(SignalAction::Buy, 100.0, 10)];
        let performance = PerformanceCalculator::calculate_performance(
            &trades,
            &curve(&[1_000.0, 1_100.0, 1_045.0]),
            1_000.0,
            3,
        );

        // daily returns +10% and -5%: mean 2.5%, population std dev 7.5%
        let expected_volatility = 0.075 * 252.0_f64.sqrt() * 100.0;
        assert!((performance.volatility - expected_volatility).abs() < 1e-9);
        let expected_sharpe = 0.025 * 252.0 / (expected_volatility / 100.0);
        assert!((performance.sharpe_ratio - expected_sharpe).abs() < 1e-9);
        assert_eq!(performance.total_trades, 0);
    }

    #[test]
    fn annualizes_over_trading_days() {
        let trades = vec![
            trade(SignalAction::Buy, 100.0, 10),
            trade(SignalAction::Sell, 121.0, 10),
        ];
        let performance = PerformanceCalculator::calculate_performance(
            &trades,
            &curve(&[1_000.0, 1_210.0]),
            1_000.0,
            504,
        );
        assert!((performance.annualized_return - 10.0).abs() < 1e-9);
    }

    #[test]
    fn rounds_only_when_asked() {
        let performance = StrategyPerformance {
            sharpe_ratio: 1.23456,
            max_drawdown: 13.636363,
            total_trades: 4,
            ..StrategyPerformance::default()
        };
        let rounded = performance.rounded();
        assert_eq!(rounded.sharpe_ratio, 1.23);
        assert_eq!(rounded.max_drawdown, 13.64);
        assert_eq!(rounded.total_trades, 4);
    }
}
