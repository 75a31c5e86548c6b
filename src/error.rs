//! Error type for a single render call.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::AxisSide;

/// Errors that abort rendering. Data gaps and degenerate axis ranges are never errors;
/// they are corrected in place.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The Y axis of `side` still has `min >= max` after every correction rule ran.
    /// Callers should show a textual error instead of a partial chart.
    #[error("Y axis MAX value must be greater than Y axis MIN value ({side} axis: min={min}, max={max})")]
    AxisRange {
        side: AxisSide,
        min: Decimal,
        max: Decimal,
    },

    /// The configuration cannot produce a plot (zero period, plot area below 1px, ...).
    #[error("invalid graph configuration: {0}")]
    Config(String),

    /// A time series or threshold source failed. Passed through uninterpreted.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl GraphError {
    /// True for errors caused by the graph configuration itself rather than a collaborator.
    pub fn is_config(&self) -> bool {
        matches!(self, GraphError::AxisRange { .. } | GraphError::Config(_))
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
