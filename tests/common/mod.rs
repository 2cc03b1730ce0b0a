#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use volbreak::domain::bar::{Bar, Side};
use volbreak::domain::error::VolbreakError;
use volbreak::domain::signal::{Signal, SignalReason};
use volbreak::domain::strategy::Strategy;
use volbreak::ports::data_port::BarFeed;
use volbreak::ports::order_port::OrderSink;

pub const SYMBOL: &str = "BTCUSDT";

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn make_bar(ts: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        symbol: SYMBOL.to_string(),
        timestamp: ts,
        open,
        high,
        low,
        close,
        volume: 1_000.0,
    }
}

/// Hourly bars from `start`, one per (open, high, low, close) tuple.
pub fn hourly_bars(start: DateTime<Utc>, ohlc: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    ohlc.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| make_bar(start + Duration::hours(i as i64), o, h, l, c))
        .collect()
}

/// Day 1 range 100-90, day 2 opens at 96 and runs through the upper band.
pub fn scenario_a() -> Vec<Bar> {
    vec![
        make_bar(at(2024, 1, 1, 10, 0), 100.0, 100.0, 90.0, 95.0),
        make_bar(at(2024, 1, 2, 10, 0), 96.0, 140.0, 95.0, 130.0),
    ]
}

pub fn params(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Emits scripted signals keyed by the index of the newest bar it is shown.
pub struct ScriptedStrategy {
    pub script: Vec<(usize, Side, f64, f64, SignalReason)>,
    pub calls: usize,
}

impl ScriptedStrategy {
    pub fn new(script: Vec<(usize, Side, f64, f64, SignalReason)>) -> Self {
        Self { script, calls: 0 }
    }
}

impl Strategy for ScriptedStrategy {
    fn initialize(&mut self, _params: &HashMap<String, f64>) -> Result<(), VolbreakError> {
        Ok(())
    }

    fn process_data(&mut self, bars: &[Bar]) -> Vec<Signal> {
        self.calls += 1;
        let index = bars.len() - 1;
        let bar = &bars[index];
        self.script
            .iter()
            .filter(|s| s.0 == index)
            .map(|&(_, side, price, quantity, reason)| Signal {
                symbol: bar.symbol.clone(),
                side,
                suggested_price: price,
                suggested_quantity: quantity,
                timestamp: bar.timestamp,
                reason,
            })
            .collect()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub struct MockBarFeed {
    pub data: HashMap<String, Vec<Bar>>,
}

impl MockBarFeed {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }
}

impl BarFeed for MockBarFeed {
    fn fetch_history(
        &self,
        symbol: &str,
        _timeframe: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<Bar> {
        self.data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| {
                        let d = b.timestamp.date_naive();
                        start.is_none_or(|s| d >= s) && end.is_none_or(|e| d <= e)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn current_price(&self, symbol: &str) -> Option<f64> {
        self.data.get(symbol)?.last().map(|b| b.close)
    }
}

#[derive(Default)]
pub struct RecordingOrderSink {
    pub orders: Vec<(String, Side, f64, f64)>,
    pub reject: bool,
}

impl OrderSink for RecordingOrderSink {
    fn place_order(&mut self, symbol: &str, side: Side, quantity: f64, price: f64) -> bool {
        self.orders.push((symbol.to_string(), side, quantity, price));
        !self.reject
    }
}
