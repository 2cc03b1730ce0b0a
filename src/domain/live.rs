//! Push-driven session: accumulate bars, re-evaluate, forward signals to a sink.

use tracing::{info, warn};

use super::bar::Bar;
use super::signal::Signal;
use super::strategy::Strategy;
use crate::ports::order_port::OrderSink;

pub struct LiveSession<S: Strategy, O: OrderSink> {
    strategy: S,
    sink: O,
    history: Vec<Bar>,
}

impl<S: Strategy, O: OrderSink> LiveSession<S, O> {
    pub fn new(strategy: S, sink: O) -> Self {
        Self {
            strategy,
            sink,
            history: Vec::new(),
        }
    }

    /// Start from bars already seen, e.g. a feed's history. Nothing is evaluated
    /// until the next `on_bar`.
    pub fn with_history(strategy: S, sink: O, history: Vec<Bar>) -> Self {
        Self {
            strategy,
            sink,
            history,
        }
    }

    /// Append `bar`, run the strategy and place an order per signal.
    ///
    /// Bars not strictly after the last one are dropped and yield no signals.
    pub fn on_bar(&mut self, bar: Bar) -> Vec<(Signal, bool)> {
        if let Some(last) = self.history.last() {
            if bar.timestamp <= last.timestamp {
                warn!(
                    symbol = %bar.symbol,
                    timestamp = %bar.timestamp,
                    last = %last.timestamp,
                    "dropping out-of-order bar"
                );
                return Vec::new();
            }
        }

        self.history.push(bar);
        self.strategy
            .process_data(&self.history)
            .into_iter()
            .map(|signal| {
                let accepted = self.sink.place_order(
                    &signal.symbol,
                    signal.side,
                    signal.suggested_quantity,
                    signal.suggested_price,
                );
                info!(
                    symbol = %signal.symbol,
                    side = %signal.side,
                    reason = %signal.reason,
                    accepted,
                    "order placed"
                );
                (signal, accepted)
            })
            .collect()
    }

    pub fn history(&self) -> &[Bar] {
        &self.history
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn sink(&self) -> &O {
        &self.sink
    }

    pub fn into_parts(self) -> (S, O) {
        (self.strategy, self.sink)
    }
}
