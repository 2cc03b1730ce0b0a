//! Fill simulation for signal-driven backtests.
//!
//! Signals fill at their suggested price and quantity. The only friction is a flat
//! commission rate charged on the notional of each fill.

use chrono::{DateTime, Utc};

use super::bar::Side;
use super::portfolio::Portfolio;
use super::position::{Position, Trade};

/// Commission on one fill: `price * quantity * rate`.
pub fn calculate_commission(price: f64, quantity: f64, commission_rate: f64) -> f64 {
    price * quantity * commission_rate
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { commission: f64 },
    /// The symbol already has an open position.
    PositionOpen,
    /// Non-positive or non-finite price or quantity.
    Rejected,
}

/// Open a position and debit the entry commission.
pub fn enter_position(
    portfolio: &mut Portfolio,
    symbol: &str,
    side: Side,
    price: f64,
    quantity: f64,
    time: DateTime<Utc>,
    commission_rate: f64,
) -> EntryResult {
    if portfolio.has_position(symbol) {
        return EntryResult::PositionOpen;
    }
    if !(price.is_finite() && price > 0.0 && quantity.is_finite() && quantity > 0.0) {
        return EntryResult::Rejected;
    }

    let commission = calculate_commission(price, quantity, commission_rate);
    portfolio.charge_commission(commission);
    portfolio.add_position(Position {
        symbol: symbol.to_string(),
        side,
        entry_price: price,
        quantity,
        entry_time: time,
    });

    EntryResult::Entered { commission }
}

/// Result of an exit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub exit_price: f64,
    pub exit_commission: f64,
    pub profit: f64,
}

/// Close `symbol`'s position at `price`, crediting the price move net of the exit
/// commission and recording the trade. `None` when nothing is open.
pub fn exit_position(
    portfolio: &mut Portfolio,
    symbol: &str,
    price: f64,
    time: DateTime<Utc>,
    commission_rate: f64,
) -> Option<ExitResult> {
    let position = portfolio.remove_position(symbol)?;

    let exit_commission = calculate_commission(price, position.quantity, commission_rate);
    let profit = position.gross_pnl(price) - exit_commission;
    let notional = position.notional();
    let profit_percent = if notional > 0.0 {
        profit / notional * 100.0
    } else {
        0.0
    };

    portfolio.balance += profit;
    portfolio.total_commission += exit_commission;
    portfolio.record_trade(Trade {
        symbol: position.symbol,
        side: position.side,
        entry_price: position.entry_price,
        exit_price: price,
        quantity: position.quantity,
        entry_time: position.entry_time,
        exit_time: time,
        profit,
        profit_percent,
    });

    Some(ExitResult {
        exit_price: price,
        exit_commission,
        profit,
    })
}
