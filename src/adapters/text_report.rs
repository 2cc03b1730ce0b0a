//! Plain-text report adapter implementing ReportPort.
//!
//! Fixed-width metric summary followed by the trade ledger.

use crate::domain::metrics::BacktestResult;
use crate::domain::position::Trade;
use crate::ports::report_port::ReportPort;

const RULE_WIDTH: usize = 96;

pub struct TextReport {
    title: String,
}

impl TextReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Default for TextReport {
    fn default() -> Self {
        Self::new("Backtest Report")
    }
}

impl ReportPort for TextReport {
    fn render(&self, result: &BacktestResult) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", self.title));
        output.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));
        output.push_str(&format_summary(result));
        output.push('\n');
        output.push_str(&format_trade_table(&result.trades));
        output
    }
}

fn row(label: &str, value: String) -> String {
    format!("{:<20}{:>16}\n", label, value)
}

fn format_profit_factor(value: f64) -> String {
    if value.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_summary(result: &BacktestResult) -> String {
    let mut output = String::new();
    output.push_str(&row("Initial balance", format!("{:.2}", result.initial_balance)));
    output.push_str(&row("Final balance", format!("{:.2}", result.final_balance)));
    output.push_str(&row("Total return", format!("{:.2}%", result.total_return)));
    output.push_str(&row("Max drawdown", format!("{:.2}%", result.max_drawdown)));
    output.push_str(&row("Total trades", result.total_trades.to_string()));
    output.push_str(&row("Winning trades", result.winning_trades.to_string()));
    output.push_str(&row("Losing trades", result.losing_trades.to_string()));
    output.push_str(&row("Win rate", format!("{:.2}%", result.win_rate)));
    output.push_str(&row("Gross profit", format!("{:.2}", result.gross_profit)));
    output.push_str(&row("Gross loss", format!("{:.2}", result.gross_loss)));
    output.push_str(&row("Profit factor", format_profit_factor(result.profit_factor)));
    output.push_str(&row("Average profit", format!("{:.2}", result.average_profit)));
    output.push_str(&row("Total commission", format!("{:.2}", result.total_commission)));
    output.push_str(&row("Equity points", result.equity_curve.len().to_string()));
    output
}

pub fn format_trade_table(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "No trades.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}{:<6}{:<18}{:<18}{:>10}{:>10}{:>12}{:>10}\n",
        "Symbol", "Side", "Entry time", "Exit time", "Entry", "Exit", "Profit", "Return"
    ));
    output.push_str(&format!("{}\n", "-".repeat(RULE_WIDTH)));

    for trade in trades {
        output.push_str(&format!(
            "{:<12}{:<6}{:<18}{:<18}{:>10.4}{:>10.4}{:>12.2}{:>9.2}%\n",
            trade.symbol,
            trade.side.to_string(),
            trade.entry_time.format("%Y-%m-%d %H:%M").to_string(),
            trade.exit_time.format("%Y-%m-%d %H:%M").to_string(),
            trade.entry_price,
            trade.exit_price,
            trade.profit,
            trade.profit_percent,
        ));
    }
    output
}
