//! Larry Williams volatility-breakout engine.
//!
//! Each trading day gets a band around its opening price, sized from the previous
//! day's range (or ATR) times `breakout_factor`. A bar piercing the band opens a
//! trade at the band edge; the trade then exits on profit target, stop loss or the
//! configured time of day, checked in that order.
//!
//! `process_data` replays the supplied history from its first bar on every call,
//! rebuilding the symbol's day and trade state, and returns only the signals of the
//! newest bar. Identical history therefore always yields identical signals.

pub mod config;
pub mod day;
pub mod sizing;

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use std::collections::HashMap;
use tracing::{debug, info};

pub use config::BreakoutConfig;
pub use day::{ActiveTrade, SymbolState, TradingDay};

use super::bar::{Bar, Side};
use super::error::VolbreakError;
use super::indicator::{average_true_range, is_range_expansion, is_strong_trend};
use super::signal::{Signal, SignalReason};
use super::strategy::Strategy;

pub const ENGINE_NAME: &str = "Larry Williams Volatility Breakout";

const UNKNOWN_SYMBOL: &str = "UNKNOWN";
const FILTER_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct BreakoutEngine {
    config: BreakoutConfig,
    symbols: HashMap<String, SymbolState>,
}

impl BreakoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BreakoutConfig) -> Self {
        BreakoutEngine {
            config,
            symbols: HashMap::new(),
        }
    }

    pub fn config(&self) -> &BreakoutConfig {
        &self.config
    }

    pub fn symbol_state(&self, symbol: &str) -> Option<&SymbolState> {
        self.symbols.get(symbol)
    }

    pub fn trading_day(&self, symbol: &str, date: NaiveDate) -> Option<&TradingDay> {
        self.symbols.get(symbol)?.trading_days.get(&date)
    }

    pub fn active_trade(&self, symbol: &str) -> Option<&ActiveTrade> {
        self.symbols.get(symbol)?.active_trade.as_ref()
    }

    /// Drop all per-symbol state.
    pub fn reset(&mut self) {
        self.symbols.clear();
    }

    fn local_time(&self, timestamp: DateTime<Utc>) -> DateTime<FixedOffset> {
        timestamp.with_timezone(&self.config.utc_offset())
    }

    fn local_date(&self, bar: &Bar) -> NaiveDate {
        self.local_time(bar.timestamp).date_naive()
    }

    fn is_valid_trading_time(&self, bar: &Bar) -> bool {
        let local = self.local_time(bar.timestamp);
        let (hour, minute) = (local.hour(), local.minute());
        if self.config.skip_first_hour && hour == self.config.market_open_hour {
            return false;
        }
        if self.config.avoid_last_half_hour
            && hour + 1 == self.config.market_close_hour
            && minute >= 30
        {
            return false;
        }
        true
    }

    fn is_past_exit_time(&self, bar: &Bar) -> bool {
        let local = self.local_time(bar.timestamp);
        let (hour, minute) = (local.hour(), local.minute());
        hour > self.config.exit_hour
            || (hour == self.config.exit_hour && minute >= self.config.exit_minute)
    }

    fn filters_pass(&self, bars: &[Bar], index: usize) -> bool {
        (!self.config.trend_filter || is_strong_trend(bars, index, FILTER_LOOKBACK))
            && (!self.config.range_filter || is_range_expansion(bars, index, FILTER_LOOKBACK))
    }

    /// Band for the day starting at `bars[index]`, from the completed day's extremes
    /// or, with ATR enabled and enough completed bars, from the ATR.
    fn open_day(&self, bars: &[Bar], index: usize, prev_high: f64, prev_low: f64) -> TradingDay {
        let day_range = prev_high - prev_low;
        let base = if self.config.use_atr {
            match average_true_range(&bars[..index], self.config.atr_period) {
                Some(atr) if atr > 0.0 => atr,
                _ => day_range,
            }
        } else {
            day_range
        };
        let bar = &bars[index];
        TradingDay::new(
            self.local_date(bar),
            bar.open,
            base * self.config.breakout_factor,
        )
    }

    fn evaluate_entries(
        &self,
        state: &mut SymbolState,
        symbol: &str,
        bars: &[Bar],
        index: usize,
        out: &mut Vec<Signal>,
    ) {
        let bar = &bars[index];
        if state.active_trade.is_some() || !self.is_valid_trading_time(bar) {
            return;
        }
        let Some(day) = state.trading_days.get_mut(&self.local_date(bar)) else {
            return;
        };

        let (direction, entry_price, reason) = if !day.long_signal_emitted
            && bar.high > day.upper_bound
            && self.filters_pass(bars, index)
        {
            day.long_signal_emitted = true;
            (Side::Buy, day.upper_bound, SignalReason::BreakoutLong)
        } else if !day.short_signal_emitted
            && bar.low < day.lower_bound
            && self.filters_pass(bars, index)
        {
            day.short_signal_emitted = true;
            (Side::Sell, day.lower_bound, SignalReason::BreakoutShort)
        } else {
            return;
        };

        let trade = ActiveTrade::open(
            symbol,
            direction,
            entry_price,
            bar.timestamp,
            day.range_size,
            &self.config,
        );
        out.push(Signal {
            symbol: symbol.to_string(),
            side: direction,
            suggested_price: entry_price,
            suggested_quantity: trade.quantity,
            timestamp: bar.timestamp,
            reason,
        });
        state.active_trade = Some(trade);
    }

    fn evaluate_exit(&self, state: &mut SymbolState, bar: &Bar, out: &mut Vec<Signal>) {
        let Some(trade) = state.active_trade.as_ref() else {
            return;
        };

        let exit = if trade.profit_target_hit(bar) {
            Some((trade.profit_target, SignalReason::TakeProfit))
        } else if trade.stop_loss_hit(bar) {
            Some((trade.stop_loss, SignalReason::StopLoss))
        } else if self.is_past_exit_time(bar) {
            Some((bar.close, SignalReason::TimeExit))
        } else {
            None
        };

        if let Some((price, reason)) = exit {
            out.push(Signal {
                symbol: trade.symbol.clone(),
                side: trade.direction.opposite(),
                suggested_price: price,
                suggested_quantity: trade.quantity,
                timestamp: bar.timestamp,
                reason,
            });
            state.active_trade = None;
        }
    }

    /// Rebuild `symbol`'s state from `bars` and collect the newest bar's signals.
    fn replay(&self, symbol: &str, bars: &[Bar]) -> (SymbolState, Vec<Signal>) {
        let mut state = SymbolState::default();
        let mut emitted = Vec::new();
        let mut latest = Vec::new();
        let last = bars.len() - 1;

        let mut current_date = self.local_date(&bars[0]);
        let mut day_high = bars[0].high;
        let mut day_low = bars[0].low;

        for (index, bar) in bars.iter().enumerate() {
            if index > 0 {
                let date = self.local_date(bar);
                if date != current_date {
                    let day = self.open_day(bars, index, day_high, day_low);
                    if index == last {
                        debug!(
                            symbol,
                            date = %day.date,
                            upper = day.upper_bound,
                            lower = day.lower_bound,
                            range = day.range_size,
                            "new trading day"
                        );
                    }
                    state.trading_days.insert(date, day);
                    current_date = date;
                    day_high = bar.high;
                    day_low = bar.low;
                } else {
                    day_high = day_high.max(bar.high);
                    day_low = day_low.min(bar.low);
                }
            }

            if index < self.config.exclude_first_n_bars {
                continue;
            }

            emitted.clear();
            self.evaluate_entries(&mut state, symbol, bars, index, &mut emitted);
            self.evaluate_exit(&mut state, bar, &mut emitted);
            if index == last {
                latest = std::mem::take(&mut emitted);
            }
        }

        (state, latest)
    }
}

impl Strategy for BreakoutEngine {
    fn initialize(&mut self, params: &HashMap<String, f64>) -> Result<(), VolbreakError> {
        let config = self.config.with_params(params)?;
        info!(
            breakout_factor = config.breakout_factor,
            profit_factor = config.profit_factor,
            stop_loss_factor = config.stop_loss_factor,
            use_atr = config.use_atr,
            atr_period = config.atr_period,
            exit_time = %format!("{:02}:{:02}", config.exit_hour, config.exit_minute),
            "initialized {ENGINE_NAME}"
        );
        self.config = config;
        self.symbols.clear();
        Ok(())
    }

    fn process_data(&mut self, bars: &[Bar]) -> Vec<Signal> {
        if bars.is_empty() || bars.len() < self.config.required_bars {
            return Vec::new();
        }

        let symbol = match bars[0].symbol.as_str() {
            "" => UNKNOWN_SYMBOL.to_string(),
            s => s.to_string(),
        };
        let (state, signals) = self.replay(&symbol, bars);
        for signal in &signals {
            info!(
                symbol = %signal.symbol,
                side = %signal.side,
                price = signal.suggested_price,
                quantity = signal.suggested_quantity,
                reason = %signal.reason,
                "signal"
            );
        }
        self.symbols.insert(symbol, state);
        signals
    }

    fn name(&self) -> &str {
        ENGINE_NAME
    }
}
