//! Per-symbol engine state: trading days and the open trade.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use super::config::BreakoutConfig;
use super::sizing::position_size;
use crate::domain::bar::{Bar, Side};

/// Breakout band for one exchange-local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingDay {
    pub date: NaiveDate,
    pub open_price: f64,
    pub upper_bound: f64,
    pub lower_bound: f64,
    pub range_size: f64,
    pub long_signal_emitted: bool,
    pub short_signal_emitted: bool,
}

impl TradingDay {
    pub fn new(date: NaiveDate, open_price: f64, range_size: f64) -> Self {
        TradingDay {
            date,
            open_price,
            upper_bound: open_price + range_size,
            lower_bound: open_price - range_size,
            range_size,
            long_signal_emitted: false,
            short_signal_emitted: false,
        }
    }
}

/// The engine's view of an open position.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTrade {
    pub symbol: String,
    pub direction: Side,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub stop_loss: f64,
    pub profit_target: f64,
    pub quantity: f64,
}

impl ActiveTrade {
    /// Places stop and target `range_size` multiples away from the entry and sizes
    /// the position from the configured account risk.
    pub fn open(
        symbol: &str,
        direction: Side,
        entry_price: f64,
        entry_time: DateTime<Utc>,
        range_size: f64,
        config: &BreakoutConfig,
    ) -> Self {
        let stop_distance = range_size * config.stop_loss_factor;
        let target_distance = range_size * config.profit_factor;
        let (stop_loss, profit_target) = match direction {
            Side::Buy => (entry_price - stop_distance, entry_price + target_distance),
            Side::Sell => (entry_price + stop_distance, entry_price - target_distance),
        };
        let quantity = position_size(
            config.account_size,
            config.risk_percent,
            entry_price,
            stop_loss,
        );

        ActiveTrade {
            symbol: symbol.to_string(),
            direction,
            entry_price,
            entry_time,
            stop_loss,
            profit_target,
            quantity,
        }
    }

    pub fn profit_target_hit(&self, bar: &Bar) -> bool {
        match self.direction {
            Side::Buy => bar.high >= self.profit_target,
            Side::Sell => bar.low <= self.profit_target,
        }
    }

    pub fn stop_loss_hit(&self, bar: &Bar) -> bool {
        match self.direction {
            Side::Buy => bar.low <= self.stop_loss,
            Side::Sell => bar.high >= self.stop_loss,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolState {
    pub trading_days: BTreeMap<NaiveDate, TradingDay>,
    pub active_trade: Option<ActiveTrade>,
}
