//! Strategy capability trait.

use std::collections::HashMap;

use super::bar::Bar;
use super::error::VolbreakError;
use super::signal::Signal;

/// A signal generator driven by accumulated bar history.
///
/// `process_data` receives the full history seen so far (ascending by timestamp) and
/// returns the signals for the newest bar. Implementations keep any per-symbol state
/// on `self`.
pub trait Strategy {
    /// Apply parameters. On error the previous configuration stays in force.
    fn initialize(&mut self, params: &HashMap<String, f64>) -> Result<(), VolbreakError>;

    fn process_data(&mut self, bars: &[Bar]) -> Vec<Signal>;

    fn name(&self) -> &str;
}
