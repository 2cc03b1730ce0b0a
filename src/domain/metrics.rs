//! Backtest result and performance statistics.

use super::portfolio::Portfolio;
use super::position::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_balance: f64,
    pub final_balance: f64,
    /// Percent.
    pub total_return: f64,
    /// Percent of the running peak.
    pub max_drawdown: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent; 0 with no trades.
    pub win_rate: f64,
    pub equity_curve: Vec<f64>,
    pub trades: Vec<Trade>,
    pub total_commission: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: f64,
    pub average_profit: f64,
}

impl BacktestResult {
    pub fn compute(portfolio: &Portfolio) -> Self {
        let trades = &portfolio.closed_trades;
        let initial_balance = portfolio.initial_capital;
        let final_balance = portfolio.balance;

        let total_return = if initial_balance > 0.0 {
            (final_balance - initial_balance) / initial_balance * 100.0
        } else {
            0.0
        };

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;

        for trade in trades {
            if trade.is_win() {
                winning_trades += 1;
                gross_profit += trade.profit;
            } else {
                losing_trades += 1;
                gross_loss += trade.profit.abs();
            }
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let average_profit = if total_trades > 0 {
            trades.iter().map(|t| t.profit).sum::<f64>() / total_trades as f64
        } else {
            0.0
        };

        BacktestResult {
            initial_balance,
            final_balance,
            total_return,
            max_drawdown: compute_max_drawdown(&portfolio.equity_curve),
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            equity_curve: portfolio.equity_curve.clone(),
            trades: trades.clone(),
            total_commission: portfolio.total_commission,
            gross_profit,
            gross_loss,
            profit_factor,
            average_profit,
        }
    }

    /// Zero-trade result for a series too short to replay.
    pub fn empty(initial_capital: f64) -> Self {
        let mut portfolio = Portfolio::new(initial_capital);
        portfolio.record_equity();
        Self::compute(&portfolio)
    }
}

/// Largest peak-to-trough decline as a percent of the peak.
pub fn compute_max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - equity) / peak * 100.0);
        }
    }
    max_dd
}
