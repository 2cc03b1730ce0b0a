//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report::TextReport;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::breakout::BreakoutEngine;
use crate::domain::config_validation::{
    parse_date, validate_backtest_config, validate_backtest_params, validate_strategy_config,
};
use crate::domain::error::VolbreakError;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::BarFeed;
use crate::ports::report_port::ReportPort;

const DEFAULT_TIMEFRAME: &str = "1h";
const DEFAULT_DATA_DIR: &str = ".";

#[derive(Parser, Debug)]
#[command(name = "volbreak", about = "Volatility-breakout signal engine and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a CSV bar file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [backtest] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Install the stderr `tracing` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
        } => run_backtest_command(&config, symbol.as_deref(), output.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, VolbreakError> {
    FileConfigAdapter::from_file(path)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", defaults.initial_capital),
        commission_rate: adapter.get_double("backtest", "commission_rate", defaults.commission_rate),
    }
}

/// Engine configured from the validated `[strategy]` section, parsed once.
pub fn build_engine(adapter: &dyn ConfigPort) -> Result<BreakoutEngine, VolbreakError> {
    Ok(BreakoutEngine::with_config(validate_strategy_config(adapter)?))
}

/// Symbol from the command line or `[backtest] symbol`, uppercased.
pub fn resolve_symbol(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Option<String> {
    symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("backtest", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

fn run_backtest_command(
    config_path: &Path,
    symbol_override: Option<&str>,
    output_path: Option<&Path>,
) -> Result<(), VolbreakError> {
    info!(path = %config_path.display(), "loading config");
    let adapter = load_config(config_path)?;

    validate_backtest_params(&adapter)?;
    let mut engine = build_engine(&adapter)?;

    let bt_config = build_backtest_config(&adapter);
    let symbol = resolve_symbol(symbol_override, &adapter).ok_or_else(|| {
        VolbreakError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        }
    })?;
    let timeframe = adapter
        .get_string("backtest", "timeframe")
        .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string());
    let data_dir = adapter
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let start = parse_date(adapter.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(adapter.get_string("backtest", "end_date").as_deref(), "end_date")?;

    let feed = CsvAdapter::new(PathBuf::from(data_dir));
    let bars = feed.fetch_history(&symbol, &timeframe, start, end);
    info!(symbol, timeframe, bars = bars.len(), "running backtest");

    let result = run_backtest(&mut engine, &bars, &bt_config);

    let report = TextReport::new(format!("{}: {} {}", engine.name(), symbol, timeframe));
    match output_path {
        Some(path) => {
            report.write(&result, path)?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{}", report.render(&result)),
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), VolbreakError> {
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    let engine = validate_strategy_config(&adapter)?;

    println!("Configuration OK: {}", config_path.display());
    println!(
        "  breakout {:.2}, profit {:.2}, stop {:.2}, exit {:02}:{:02}, ATR {}",
        engine.breakout_factor,
        engine.profit_factor,
        engine.stop_loss_factor,
        engine.exit_hour,
        engine.exit_minute,
        if engine.use_atr {
            format!("on ({})", engine.atr_period)
        } else {
            "off".to_string()
        }
    );
    Ok(())
}
