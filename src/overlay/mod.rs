//! Auxiliary lines drawn over the series: percentiles and trigger thresholds.

pub mod percentile;
pub mod trigger;

pub use percentile::{Percentile, PercentileCalculator, nearest_rank};
pub use trigger::{
    TRIGGER_LIMIT, ThresholdExpr, TriggerCandidate, TriggerOverlay, TriggerOverlayCalculator,
    parse_threshold,
};
