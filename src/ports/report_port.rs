//! Report generation port trait.

use crate::domain::error::VolbreakError;
use crate::domain::metrics::BacktestResult;
use std::path::Path;

/// Port for rendering backtest reports.
pub trait ReportPort {
    fn render(&self, result: &BacktestResult) -> String;

    /// Default implementation: writes `render` output to `output_path`.
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), VolbreakError> {
        std::fs::write(output_path, self.render(result))?;
        Ok(())
    }
}
