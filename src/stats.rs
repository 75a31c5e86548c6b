use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{CalcFn, SeriesSpec};
use crate::resample::SeriesData;

/// Legend statistics of one series.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesSummary {
    /// Calc-function value of the right-most column that holds a sample.
    pub last: Option<Decimal>,
    pub min: Decimal,
    /// Mean of the averages the source returned, gap-filled columns excluded.
    pub avg: Decimal,
    pub max: Decimal,
}

/// Summarise a resampled series; `None` when the source returned nothing.
pub fn series_summary(spec: &SeriesSpec, data: &SeriesData) -> Option<SeriesSummary> {
    if !data.has_data {
        return None;
    }
    let last = data.known_columns().last().map(|c| match spec.calc_fn {
        CalcFn::Min => data.min[c],
        CalcFn::Max => data.max[c],
        CalcFn::Avg | CalcFn::All => data.avg[c],
    });
    Some(SeriesSummary {
        last,
        min: data.min.iter().copied().min()?,
        avg: data.avg_orig?,
        max: data.max.iter().copied().max()?,
    })
}
