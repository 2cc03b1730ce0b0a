//! Order placement port trait.

use crate::domain::bar::Side;

pub trait OrderSink {
    /// Submit an order. Returns whether the venue accepted it.
    fn place_order(&mut self, symbol: &str, side: Side, quantity: f64, price: f64) -> bool;
}
