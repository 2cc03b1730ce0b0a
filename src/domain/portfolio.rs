//! Simulated account: realized balance, open positions and the trade ledger.

use std::collections::HashMap;

use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    /// Realized equity: initial capital minus commissions plus closed-trade profit.
    pub balance: f64,
    pub initial_capital: f64,
    pub positions: HashMap<String, Position>,
    pub closed_trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,
    pub total_commission: f64,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            balance: initial_capital,
            initial_capital,
            positions: HashMap::new(),
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
            total_commission: 0.0,
        }
    }

    pub fn add_position(&mut self, position: Position) {
        self.positions.insert(position.symbol.clone(), position);
    }

    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn remove_position(&mut self, symbol: &str) -> Option<Position> {
        self.positions.remove(symbol)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.closed_trades.push(trade);
    }

    pub fn record_equity(&mut self) {
        self.equity_curve.push(self.balance);
    }

    pub fn charge_commission(&mut self, commission: f64) {
        self.balance -= commission;
        self.total_commission += commission;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Side;
    use chrono::{TimeZone, Utc};

    fn sample_position(symbol: &str, side: Side) -> Position {
        Position {
            symbol: symbol.to_string(),
            side,
            entry_price: 100.0,
            quantity: 10.0,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn new_portfolio() {
        let portfolio = Portfolio::new(10_000.0);
        assert!((portfolio.balance - 10_000.0).abs() < f64::EPSILON);
        assert!((portfolio.initial_capital - 10_000.0).abs() < f64::EPSILON);
        assert!(portfolio.positions.is_empty());
        assert!(portfolio.closed_trades.is_empty());
        assert!(portfolio.equity_curve.is_empty());
    }

    #[test]
    fn one_position_per_symbol() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio.add_position(sample_position("BTCUSDT", Side::Buy));
        portfolio.add_position(sample_position("BTCUSDT", Side::Sell));
        assert_eq!(portfolio.position_count(), 1);
        assert!(portfolio.get_position("BTCUSDT").unwrap().is_short());

        portfolio.add_position(sample_position("ETHUSDT", Side::Buy));
        assert_eq!(portfolio.position_count(), 2);

        assert!(portfolio.remove_position("BTCUSDT").is_some());
        assert!(!portfolio.has_position("BTCUSDT"));
        assert!(portfolio.remove_position("BTCUSDT").is_none());
    }

    #[test]
    fn commission_reduces_balance() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio.charge_commission(10.0);
        portfolio.charge_commission(2.5);
        assert!((portfolio.balance - 9_987.5).abs() < 1e-9);
        assert!((portfolio.total_commission - 12.5).abs() < 1e-9);
    }

    #[test]
    fn record_equity_snapshots_balance() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio.record_equity();
        portfolio.balance = 10_050.0;
        portfolio.record_equity();
        assert_eq!(portfolio.equity_curve, vec![10_000.0, 10_050.0]);
    }
}
