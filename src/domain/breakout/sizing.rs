//! Fixed-fractional position sizing.

/// Floor applied to |entry - stop| so a degenerate stop never divides by zero.
pub const MIN_PRICE_DIFFERENCE: f64 = 0.00001;

/// Quantity such that a stop-out loses `account_balance * risk_percent`.
///
/// Rounded down to 5 decimals below a price of 100, 4 below 1000 and 3 above.
pub fn position_size(
    account_balance: f64,
    risk_percent: f64,
    entry_price: f64,
    stop_loss_price: f64,
) -> f64 {
    let risk_amount = account_balance * risk_percent;
    let price_difference = (entry_price - stop_loss_price)
        .abs()
        .max(MIN_PRICE_DIFFERENCE);
    floor_to(risk_amount / price_difference, quantity_decimals(entry_price))
}

fn quantity_decimals(price: f64) -> i32 {
    if price < 100.0 {
        5
    } else if price < 1000.0 {
        4
    } else {
        3
    }
}

fn floor_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).floor() / scale
}
