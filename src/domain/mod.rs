//! Core domain types and logic.

pub mod bar;
pub mod signal;
pub mod strategy;
pub mod indicator;
pub mod breakout;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod live;
pub mod error;
