//! Bar-series helpers used by the breakout rules: simple ATR and the
//! trend / range-expansion entry filters.

use super::bar::Bar;

/// Current bar range must exceed the lookback average by this ratio.
pub const RANGE_EXPANSION_RATIO: f64 = 1.2;

/// Simple (non-smoothed) mean of the last `period` true ranges.
///
/// Needs `period + 1` bars since each true range looks at the previous close.
pub fn average_true_range(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }
    let sum: f64 = bars
        .windows(2)
        .rev()
        .take(period)
        .map(|w| w[1].true_range(w[0].close))
        .sum();
    Some(sum / period as f64)
}

/// True when the `lookback` bar pairs before `index` form a strict
/// higher-high/higher-low run or a strict lower-high/lower-low run.
pub fn is_strong_trend(bars: &[Bar], index: usize, lookback: usize) -> bool {
    if index < lookback + 1 || index >= bars.len() {
        return false;
    }

    let mut uptrend = true;
    let mut downtrend = true;
    for k in 1..=lookback {
        let current = &bars[index - k];
        let previous = &bars[index - k - 1];
        if current.high <= previous.high || current.low <= previous.low {
            uptrend = false;
        }
        if current.high >= previous.high || current.low >= previous.low {
            downtrend = false;
        }
    }
    uptrend || downtrend
}

/// True when the bar at `index` is wider than [`RANGE_EXPANSION_RATIO`] times the
/// mean range of the `lookback` bars before it.
pub fn is_range_expansion(bars: &[Bar], index: usize, lookback: usize) -> bool {
    if lookback == 0 || index < lookback || index >= bars.len() {
        return false;
    }
    let average = bars[index - lookback..index]
        .iter()
        .map(Bar::range)
        .sum::<f64>()
        / lookback as f64;
    bars[index].range() > average * RANGE_EXPANSION_RATIO
}
