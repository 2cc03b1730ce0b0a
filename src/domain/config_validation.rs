//! Configuration validation.
//!
//! Checks the `[backtest]` and `[strategy]` sections before anything runs.

use crate::domain::backtest::BacktestConfig;
use crate::domain::breakout::BreakoutConfig;
use crate::domain::error::VolbreakError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), VolbreakError> {
    validate_backtest_params(config)?;
    validate_symbol(config)
}

/// Capital, commission and date checks. The symbol is left to the caller, which
/// may take it from the command line instead.
pub fn validate_backtest_params(config: &dyn ConfigPort) -> Result<(), VolbreakError> {
    validate_initial_capital(config)?;
    validate_commission_rate(config)?;
    validate_dates(config)
}

/// Parse the `[strategy]` section into an engine configuration.
pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<BreakoutConfig, VolbreakError> {
    let params = config.section_params("strategy")?;
    BreakoutConfig::from_params(&params)
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), VolbreakError> {
    let default = BacktestConfig::default().initial_capital;
    let value = config.get_double("backtest", "initial_capital", default);
    if !(value.is_finite() && value > 0.0) {
        return Err(VolbreakError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be a positive finite number".to_string(),
        });
    }
    Ok(())
}

fn validate_commission_rate(config: &dyn ConfigPort) -> Result<(), VolbreakError> {
    let default = BacktestConfig::default().commission_rate;
    let value = config.get_double("backtest", "commission_rate", default);
    if !(0.0..1.0).contains(&value) {
        return Err(VolbreakError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "commission_rate".to_string(),
            reason: "commission_rate must be in [0, 1)".to_string(),
        });
    }
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), VolbreakError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(VolbreakError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), VolbreakError> {
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(VolbreakError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must not be after end_date".to_string(),
            });
        }
    }
    Ok(())
}

/// Optional `YYYY-MM-DD` value from the `[backtest]` section.
pub fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, VolbreakError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| VolbreakError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }),
    }
}
