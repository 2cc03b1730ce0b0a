//! CSV file bar feed.
//!
//! One file per symbol and timeframe, `{base_path}/{SYMBOL}_{timeframe}.csv`, with the
//! columns `timestamp,open,high,low,close,volume`. Timestamps are RFC 3339,
//! `YYYY-MM-DD HH:MM:SS` (UTC) or integer epoch seconds.

use crate::domain::bar::Bar;
use crate::domain::error::VolbreakError;
use crate::ports::data_port::BarFeed;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, timeframe))
    }

    /// Strict variant of [`BarFeed::fetch_history`] that reports what went wrong.
    pub fn read_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, VolbreakError> {
        let path = self.csv_path(symbol, timeframe);
        let feed_err = |reason: String| VolbreakError::Feed {
            symbol: symbol.to_string(),
            reason,
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| feed_err(format!("failed to read {}: {}", path.display(), e)))?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| feed_err(format!("CSV parse error: {}", e)))?;
            let row = line + 2;

            let raw_ts = record
                .get(0)
                .ok_or_else(|| feed_err(format!("row {row}: missing timestamp column")))?;
            let timestamp = parse_timestamp(raw_ts)
                .ok_or_else(|| feed_err(format!("row {row}: invalid timestamp '{raw_ts}'")))?;

            let date = timestamp.date_naive();
            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }

            let field = |index: usize, name: &str| -> Result<f64, VolbreakError> {
                record
                    .get(index)
                    .ok_or_else(|| feed_err(format!("row {row}: missing {name} column")))?
                    .trim()
                    .parse()
                    .map_err(|e| feed_err(format!("row {row}: invalid {name} value: {e}")))
            };

            bars.push(Bar {
                symbol: symbol.to_string(),
                timestamp,
                open: field(1, "open")?,
                high: field(2, "high")?,
                low: field(3, "low")?,
                close: field(4, "close")?,
                volume: field(5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!(symbol, timeframe, bars = bars.len(), path = %path.display(), "loaded bars");
        Ok(bars)
    }

    /// Timeframes with a CSV file for `symbol`, sorted.
    pub fn list_timeframes(&self, symbol: &str) -> Result<Vec<String>, VolbreakError> {
        let entries = fs::read_dir(&self.base_path)?;
        let prefix = format!("{}_", symbol);
        let mut timeframes = Vec::new();

        for entry in entries {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(tf) = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(".csv"))
            {
                timeframes.push(tf.to_string());
            }
        }

        timeframes.sort();
        Ok(timeframes)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

impl BarFeed for CsvAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        timeframe: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<Bar> {
        match self.read_bars(symbol, timeframe, start, end) {
            Ok(bars) => bars,
            Err(e) => {
                warn!(symbol, timeframe, error = %e, "bar feed failed, returning empty series");
                Vec::new()
            }
        }
    }

    /// Last close of the first timeframe file found for `symbol`.
    fn current_price(&self, symbol: &str) -> Option<f64> {
        let timeframe = match self.list_timeframes(symbol) {
            Ok(tfs) => tfs.into_iter().next()?,
            Err(e) => {
                warn!(symbol, error = %e, "cannot list bar files");
                return None;
            }
        };
        self.fetch_history(symbol, &timeframe, None, None)
            .last()
            .map(|b| b.close)
    }
}
