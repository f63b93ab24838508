use crate::models::{EquityPoint, PriceBar, Signal, SignalAction, Trade};
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PositionState {
    Flat,
    Long { shares: u64, cost_basis: f64 },
}

/// Single-symbol cash account: all cash in on a buy, all shares out on a sell.
#[derive(Debug)]
struct Account {
    cash: f64,
    position: PositionState,
}

impl Account {
    fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            position: PositionState::Flat,
        }
    }

    fn value_at(&self, price: f64) -> f64 {
        match self.position {
            PositionState::Flat => self.cash,
            PositionState::Long { shares, .. } => self.cash + shares as f64 * price,
        }
    }

    fn apply(&mut self, signal: &Signal) -> Option<Trade> {
        match (signal.action, self.position) {
            (SignalAction::Buy, PositionState::Flat) => self.execute_buy_signal(signal),
            (SignalAction::Sell, PositionState::Long { shares, cost_basis }) => {
                Some(self.execute_sell_signal(signal, shares, cost_basis))
            }
            (action, _) => {
                warn!(
                    "Ignoring {} signal on {} that does not match the current position",
                    action.as_str(),
                    signal.date
                );
                None
            }
        }
    }

    fn execute_buy_signal(&mut self, signal: &Signal) -> Option<Trade> {
        let price = signal.price;
        if !(price.is_finite() && price > 0.0) {
            debug!("Skipping buy on {}: unusable price {}", signal.date, price);
            return None;
        }

        let shares = (self.cash / price).floor();
        if shares < 1.0 {
            debug!(
                "Skipping buy on {}: price {:.2} exceeds available cash {:.2}",
                signal.date, price, self.cash
            );
            return None;
        }
        let shares = shares as u64;

        let cost = shares as f64 * price;
        self.cash -= cost;
        self.position = PositionState::Long {
            shares,
            cost_basis: cost,
        };
        debug!("Bought {} shares at {:.2} on {}", shares, price, signal.date);

        Some(Trade {
            date: signal.date,
            action: SignalAction::Buy,
            price,
            quantity: shares,
            value: cost,
            rationale: signal.rationale.clone(),
            portfolio_value: self.value_at(price),
        })
    }

    fn execute_sell_signal(&mut self, signal: &Signal, shares: u64, cost_basis: f64) -> Trade {
        let proceeds = shares as f64 * signal.price;
        self.cash += proceeds;
        self.position = PositionState::Flat;
        debug!(
            "Sold {} shares at {:.2} on {} (pnl {:.2})",
            shares,
            signal.price,
            signal.date,
            proceeds - cost_basis
        );

        Trade {
            date: signal.date,
            action: SignalAction::Sell,
            price: signal.price,
            quantity: shares,
            value: proceeds,
            rationale: signal.rationale.clone(),
            portfolio_value: self.cash,
        }
    }
}

pub struct TradeExecutor {
    initial_capital: f64,
}

impl TradeExecutor {
    pub fn new(initial_capital: f64) -> Self {
        Self { initial_capital }
    }

    /// Replay `signals` against `bars` in date order.
    ///
    /// Each signal is applied on the first bar dated on or after it, before that
    /// bar is marked to market, so the equity curve reflects the position held
    /// at every close.
    pub fn execute(&self, signals: &[Signal], bars: &[PriceBar]) -> ExecutionResult {
        let mut account = Account::new(self.initial_capital);
        let mut trades = Vec::new();
        let mut equity_curve = Vec::with_capacity(bars.len());
        let mut pending = signals.iter().peekable();

        for bar in bars {
            while let Some(signal) = pending.next_if(|signal| signal.date <= bar.date) {
                trades.extend(account.apply(signal));
            }

            equity_curve.push(EquityPoint {
                date: bar.date,
                value: account.value_at(bar.close),
                price: bar.close,
            });
        }

        for signal in pending {
            trades.extend(account.apply(signal));
        }

        ExecutionResult {
            trades,
            equity_curve,
        }
    }
}
