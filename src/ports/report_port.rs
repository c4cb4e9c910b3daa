//! Report generation port trait.

use crate::domain::backtest::BacktestRun;
use crate::domain::error::TradesimError;
use crate::domain::ohlcv::OhlcvBar;

/// Port for writing per-bar backtest detail.
pub trait ReportPort {
    fn write(
        &self,
        run: &BacktestRun,
        bars: &[OhlcvBar],
        output_path: &str,
    ) -> Result<(), TradesimError>;
}
