//! Trade signals emitted by strategies.

use chrono::{DateTime, Utc};
use std::fmt;

use super::bar::Side;

/// Why a signal was emitted. Entries and exits are told apart by this, not by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalReason {
    BreakoutLong,
    BreakoutShort,
    TakeProfit,
    StopLoss,
    TimeExit,
}

impl SignalReason {
    pub fn is_entry(self) -> bool {
        matches!(self, SignalReason::BreakoutLong | SignalReason::BreakoutShort)
    }

    pub fn is_exit(self) -> bool {
        !self.is_entry()
    }
}

impl fmt::Display for SignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalReason::BreakoutLong => "Volatility Breakout Long",
            SignalReason::BreakoutShort => "Volatility Breakout Short",
            SignalReason::TakeProfit => "Take Profit",
            SignalReason::StopLoss => "Stop Loss",
            SignalReason::TimeExit => "Time Exit",
        };
        f.write_str(s)
    }
}

/// An immutable trade request. Not a guarantee of execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub side: Side,
    pub suggested_price: f64,
    pub suggested_quantity: f64,
    pub timestamp: DateTime<Utc>,
    pub reason: SignalReason,
}

impl Signal {
    pub fn is_entry(&self) -> bool {
        self.reason.is_entry()
    }

    pub fn is_exit(&self) -> bool {
        self.reason.is_exit()
    }
}
