//! Nearest-rank percentile lines per Y axis side.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::config::GraphConfig;
use crate::models::{AxisSide, CalcFn, GraphType};
use crate::resample::SeriesData;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentile {
    pub side: AxisSide,
    pub percent: Decimal,
    pub value: Decimal,
}

/// `sorted[ceil(percent / 100 * n) - 1]` over an ascending copy of `values`.
pub fn nearest_rank(values: &[Decimal], percent: Decimal) -> Option<Decimal> {
    if values.is_empty() || percent <= Decimal::ZERO {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let n = sorted.len();
    let rank = (percent / Decimal::ONE_HUNDRED * Decimal::from(n))
        .ceil()
        .to_usize()
        .unwrap_or(n)
        .clamp(1, n);
    Some(sorted[rank - 1])
}

pub struct PercentileCalculator<'a> {
    config: &'a GraphConfig,
}

impl<'a> PercentileCalculator<'a> {
    pub fn new(config: &'a GraphConfig) -> Self {
        Self { config }
    }

    /// Percentiles of the plotted values of every side with a positive percent.
    /// Stacked graphs have none.
    pub fn compute(&self, data: &[SeriesData]) -> Vec<Percentile> {
        if self.config.graph_type != GraphType::Normal {
            return Vec::new();
        }

        AxisSide::BOTH
            .into_iter()
            .filter_map(|side| {
                let percent = self.config.percentile.side(side);
                if percent <= Decimal::ZERO {
                    return None;
                }
                let values: Vec<Decimal> = self
                    .config
                    .series
                    .iter()
                    .zip(data)
                    .filter(|(spec, _)| spec.axis == side)
                    .flat_map(|(spec, d)| {
                        let vals = match spec.calc_fn {
                            CalcFn::Max => &d.max,
                            CalcFn::Min => &d.min,
                            CalcFn::Avg | CalcFn::All => &d.avg,
                        };
                        d.count
                            .iter()
                            .zip(vals)
                            .filter(|(c, _)| **c > 0)
                            .map(|(_, v)| *v)
                    })
                    .collect();
                nearest_rank(&values, percent).map(|value| Percentile { side, percent, value })
            })
            .collect()
    }
}
