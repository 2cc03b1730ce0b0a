//! Bar feed port trait.

use crate::domain::bar::Bar;
use chrono::NaiveDate;

/// Source of historical and current prices for one symbol at a time.
///
/// Failures do not cross this boundary: implementations log them and return an
/// empty series or `None`.
pub trait BarFeed {
    /// Bars for `symbol` at `timeframe`, ascending by timestamp, restricted to the
    /// inclusive UTC date range when bounds are given.
    fn fetch_history(
        &self,
        symbol: &str,
        timeframe: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<Bar>;

    fn current_price(&self, symbol: &str) -> Option<f64>;
}
