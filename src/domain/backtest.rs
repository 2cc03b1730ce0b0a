//! Signal-driven backtest loop.
//!
//! The strategy sees a growing prefix of the series, one bar longer per step, and
//! its signals fill immediately at their suggested price and quantity.

use tracing::{debug, info};

use super::bar::Bar;
use super::execution::{enter_position, exit_position, EntryResult};
use super::metrics::BacktestResult;
use super::portfolio::Portfolio;
use super::signal::Signal;
use super::strategy::Strategy;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Fraction of notional charged per fill.
    pub commission_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 10_000.0,
            commission_rate: 0.001,
        }
    }
}

pub fn run_backtest<S: Strategy + ?Sized>(
    strategy: &mut S,
    bars: &[Bar],
    config: &BacktestConfig,
) -> BacktestResult {
    if bars.len() < 2 {
        info!(
            strategy = strategy.name(),
            bars = bars.len(),
            "not enough bars to backtest"
        );
        return BacktestResult::empty(config.initial_capital);
    }

    let mut portfolio = Portfolio::new(config.initial_capital);
    portfolio.record_equity();

    for i in 1..bars.len() {
        portfolio.record_equity();
        for signal in strategy.process_data(&bars[..=i]) {
            apply_signal(&mut portfolio, &signal, config);
        }
    }

    let Some(last) = bars.last() else {
        return BacktestResult::empty(config.initial_capital);
    };
    let mut open: Vec<String> = portfolio.positions.keys().cloned().collect();
    open.sort();
    for symbol in open {
        if let Some(exit) =
            exit_position(&mut portfolio, &symbol, last.close, last.timestamp, config.commission_rate)
        {
            debug!(symbol, price = exit.exit_price, profit = exit.profit, "force-closed at end of data");
        }
    }

    let result = BacktestResult::compute(&portfolio);
    info!(
        strategy = strategy.name(),
        bars = bars.len(),
        trades = result.total_trades,
        final_balance = result.final_balance,
        total_return = result.total_return,
        max_drawdown = result.max_drawdown,
        "backtest complete"
    );
    result
}

fn apply_signal(portfolio: &mut Portfolio, signal: &Signal, config: &BacktestConfig) {
    if signal.is_entry() {
        match enter_position(
            portfolio,
            &signal.symbol,
            signal.side,
            signal.suggested_price,
            signal.suggested_quantity,
            signal.timestamp,
            config.commission_rate,
        ) {
            EntryResult::Entered { commission } => debug!(
                symbol = %signal.symbol,
                side = %signal.side,
                price = signal.suggested_price,
                quantity = signal.suggested_quantity,
                commission,
                "entry filled"
            ),
            EntryResult::PositionOpen => {
                debug!(symbol = %signal.symbol, "entry ignored: position already open")
            }
            EntryResult::Rejected => debug!(
                symbol = %signal.symbol,
                price = signal.suggested_price,
                quantity = signal.suggested_quantity,
                "entry rejected"
            ),
        }
    } else {
        match exit_position(
            portfolio,
            &signal.symbol,
            signal.suggested_price,
            signal.timestamp,
            config.commission_rate,
        ) {
            Some(exit) => debug!(
                symbol = %signal.symbol,
                reason = %signal.reason,
                price = exit.exit_price,
                profit = exit.profit,
                "exit filled"
            ),
            None => debug!(symbol = %signal.symbol, "exit ignored: no open position"),
        }
    }
}
