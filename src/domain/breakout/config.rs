//! Breakout engine parameters and their validation.
//!
//! Parameters arrive as a flat `name -> f64` map. Names match case-insensitively
//! with underscores ignored, so `breakoutFactor`, `breakout_factor` and
//! `breakoutfactor` are the same key. Boolean flags are on when `value > 0.5`.

use chrono::{FixedOffset, Offset, Utc};
use std::collections::HashMap;
use tracing::warn;

use crate::domain::error::VolbreakError;

#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutConfig {
    pub breakout_factor: f64,
    pub profit_factor: f64,
    pub stop_loss_factor: f64,
    pub required_bars: usize,
    pub exclude_first_n_bars: usize,
    pub use_atr: bool,
    pub atr_period: usize,
    pub exit_hour: u32,
    pub exit_minute: u32,
    pub trend_filter: bool,
    pub range_filter: bool,
    pub skip_first_hour: bool,
    pub avoid_last_half_hour: bool,
    pub market_open_hour: u32,
    pub market_close_hour: u32,
    pub account_size: f64,
    pub risk_percent: f64,
    pub utc_offset_minutes: i32,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        BreakoutConfig {
            breakout_factor: 0.25,
            profit_factor: 2.0,
            stop_loss_factor: 1.0,
            required_bars: 2,
            exclude_first_n_bars: 1,
            use_atr: false,
            atr_period: 14,
            exit_hour: 21,
            exit_minute: 59,
            trend_filter: false,
            range_filter: false,
            skip_first_hour: false,
            avoid_last_half_hour: false,
            market_open_hour: 9,
            market_close_hour: 16,
            account_size: 10_000.0,
            risk_percent: 0.01,
            utc_offset_minutes: 0,
        }
    }
}

impl BreakoutConfig {
    /// Defaults overlaid with `params`, validated.
    pub fn from_params(params: &HashMap<String, f64>) -> Result<Self, VolbreakError> {
        Self::default().with_params(params)
    }

    /// A copy of `self` overlaid with `params`, validated. `self` is untouched on error.
    pub fn with_params(&self, params: &HashMap<String, f64>) -> Result<Self, VolbreakError> {
        let mut config = self.clone();
        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();
        for key in keys {
            config.apply(key, params[key])?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Exchange-local offset used for day boundaries and time-of-day rules.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    fn apply(&mut self, key: &str, value: f64) -> Result<(), VolbreakError> {
        if !value.is_finite() {
            return Err(VolbreakError::invalid_param(key, "must be a finite number"));
        }
        match normalize_key(key).as_str() {
            "breakoutfactor" => self.breakout_factor = value,
            "profitfactor" => self.profit_factor = value,
            "stoplossfactor" => self.stop_loss_factor = value,
            "requiredbars" => self.required_bars = to_count(key, value)?,
            "excludefirstnbars" => self.exclude_first_n_bars = to_count(key, value)?,
            "useatr" => self.use_atr = value > 0.5,
            "atrperiod" => self.atr_period = to_count(key, value)?,
            "exithour" => self.exit_hour = to_clock(key, value)?,
            "exitminute" => self.exit_minute = to_clock(key, value)?,
            "trendfilter" => self.trend_filter = value > 0.5,
            "rangefilter" => self.range_filter = value > 0.5,
            "skipfirsthour" => self.skip_first_hour = value > 0.5,
            "avoidlasthalfhour" => self.avoid_last_half_hour = value > 0.5,
            "marketopenhour" => self.market_open_hour = to_clock(key, value)?,
            "marketclosehour" => self.market_close_hour = to_clock(key, value)?,
            "accountsize" => self.account_size = value,
            "riskpercent" => self.risk_percent = value,
            "utcoffsetminutes" => {
                if value.abs() >= 1440.0 {
                    return Err(VolbreakError::invalid_param(
                        key,
                        "must be within one day of UTC",
                    ));
                }
                self.utc_offset_minutes = value.trunc() as i32;
            }
            _ => warn!(key, value, "ignoring unknown strategy parameter"),
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), VolbreakError> {
        if !(self.breakout_factor > 0.0 && self.breakout_factor <= 1.0) {
            return Err(VolbreakError::invalid_param(
                "breakoutFactor",
                format!("{} is outside (0, 1]", self.breakout_factor),
            ));
        }
        if self.profit_factor <= 0.0 {
            return Err(VolbreakError::invalid_param("profitFactor", "must be positive"));
        }
        if self.stop_loss_factor <= 0.0 {
            return Err(VolbreakError::invalid_param("stopLossFactor", "must be positive"));
        }
        if self.required_bars < 1 {
            return Err(VolbreakError::invalid_param("requiredBars", "must be at least 1"));
        }
        if self.atr_period < 1 {
            return Err(VolbreakError::invalid_param("atrPeriod", "must be at least 1"));
        }
        if self.exit_hour > 23 {
            return Err(VolbreakError::invalid_param("exitHour", "must be 0-23"));
        }
        if self.exit_minute > 59 {
            return Err(VolbreakError::invalid_param("exitMinute", "must be 0-59"));
        }
        if self.market_open_hour > 23 {
            return Err(VolbreakError::invalid_param("marketOpenHour", "must be 0-23"));
        }
        if !(1..=24).contains(&self.market_close_hour) {
            return Err(VolbreakError::invalid_param("marketCloseHour", "must be 1-24"));
        }
        if self.account_size <= 0.0 {
            return Err(VolbreakError::invalid_param("accountSize", "must be positive"));
        }
        if !(self.risk_percent > 0.0 && self.risk_percent <= 1.0) {
            return Err(VolbreakError::invalid_param("riskPercent", "must be in (0, 1]"));
        }
        Ok(())
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn to_count(key: &str, value: f64) -> Result<usize, VolbreakError> {
    if value < 0.0 {
        return Err(VolbreakError::invalid_param(key, "must be non-negative"));
    }
    Ok(value.trunc() as usize)
}

fn to_clock(key: &str, value: f64) -> Result<u32, VolbreakError> {
    if !(0.0..=24.0 * 60.0).contains(&value) {
        return Err(VolbreakError::invalid_param(key, "is not a valid clock value"));
    }
    Ok(value.trunc() as u32)
}
