//! Dense per-pixel series: gap filling and stacking shifts.
//!
//! Sources return sparse per-column aggregates. [`SeriesResampler`] turns them into arrays of
//! exactly one entry per pixel column:
//! - gaps between two known columns are linearly interpolated
//! - a leading gap is flat-filled backward with the first known value
//! - a trailing gap is flat-filled forward with the last known value
//! - in stacked graphs every series is shifted by its nearest same-side predecessor

use rust_decimal::Decimal;
use serde::Serialize;

use crate::context::RenderContext;
use crate::models::{AxisSide, CalcFn, ColumnAggregate, SeriesSpec};

/// Sign of the data plotted against one axis side. Negative wins once seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Orientation {
    #[default]
    Unknown,
    Positive,
    Negative,
}

impl Orientation {
    /// Fold the minimum of one series into the side's orientation.
    pub fn observe(self, min: Decimal) -> Orientation {
        if min < Decimal::ZERO {
            Orientation::Negative
        } else if self == Orientation::Unknown && min > Decimal::ZERO {
            Orientation::Positive
        } else {
            self
        }
    }

    pub fn is_negative(self) -> bool {
        self == Orientation::Negative
    }
}

/// One series after resampling. Every array has exactly `width` entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub count: Vec<u64>,
    pub min: Vec<Decimal>,
    pub max: Vec<Decimal>,
    pub avg: Vec<Decimal>,
    pub clock: Vec<Decimal>,
    pub shift_min: Vec<Decimal>,
    pub shift_max: Vec<Decimal>,
    pub shift_avg: Vec<Decimal>,
    /// False when the source returned no samples at all.
    pub has_data: bool,
    /// Mean of the averages the source actually returned (before gap filling).
    pub avg_orig: Option<Decimal>,
    /// Minimum of the known minimums, used for the side's orientation.
    pub known_min: Option<Decimal>,
}

impl SeriesData {
    /// Zero-filled arrays for a series without samples.
    pub fn empty(width: usize) -> Self {
        let zeros = vec![Decimal::ZERO; width];
        Self {
            count: vec![0; width],
            min: zeros.clone(),
            max: zeros.clone(),
            avg: zeros.clone(),
            clock: zeros.clone(),
            shift_min: zeros.clone(),
            shift_max: zeros.clone(),
            shift_avg: zeros,
            has_data: false,
            avg_orig: None,
            known_min: None,
        }
    }

    pub fn width(&self) -> usize {
        self.count.len()
    }

    /// Array selected by a calc function; `All` reads the average.
    pub fn values(&self, calc_fn: CalcFn) -> &[Decimal] {
        match calc_fn {
            CalcFn::Min => &self.min,
            CalcFn::Max => &self.max,
            CalcFn::Avg | CalcFn::All => &self.avg,
        }
    }

    pub fn shifts(&self, calc_fn: CalcFn) -> &[Decimal] {
        match calc_fn {
            CalcFn::Min => &self.shift_min,
            CalcFn::Max => &self.shift_max,
            CalcFn::Avg | CalcFn::All => &self.shift_avg,
        }
    }

    /// Columns that hold a real or forced sample.
    pub fn known_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.count
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(i, _)| i)
    }
}

/// Resamples every series of a render into [`SeriesData`].
pub struct SeriesResampler<'a> {
    ctx: &'a RenderContext,
}

impl<'a> SeriesResampler<'a> {
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self { ctx }
    }

    /// Gap-fill each series, then apply stacking shifts in stacked graphs.
    /// `raw[i]` holds the aggregates returned for `specs[i]`.
    pub fn run(&self, specs: &[SeriesSpec], raw: Vec<Vec<ColumnAggregate>>) -> Vec<SeriesData> {
        let mut data: Vec<SeriesData> = raw.into_iter().map(|cols| self.resample(cols)).collect();
        if self.ctx.is_stacked() {
            apply_stacking(specs, &mut data);
        }
        data
    }

    /// Place the sparse columns and fill every gap.
    pub fn resample(&self, columns: Vec<ColumnAggregate>) -> SeriesData {
        let width = self.ctx.columns();
        let mut data = SeriesData::empty(width);

        for col in columns {
            if col.column >= width || col.count == 0 {
                continue;
            }
            let i = col.column;
            data.count[i] = col.count;
            data.min[i] = col.min;
            data.max[i] = col.max;
            data.avg[i] = col.avg;
            data.clock[i] = col.clock;
        }

        let known: Vec<usize> = data.known_columns().collect();
        if known.is_empty() {
            return data;
        }
        data.has_data = true;
        data.known_min = known.iter().map(|&i| data.min[i]).min();
        let sum: Decimal = known.iter().map(|&i| data.avg[i]).sum();
        data.avg_orig = Some(sum / Decimal::from(known.len()));

        self.fill_gaps(&mut data);
        data
    }

    fn fill_gaps(&self, data: &mut SeriesData) {
        let width = data.width();
        let step = self.ctx.window.column_seconds();
        let force_count = self.ctx.is_stacked();

        let mut missing = 0usize;
        for ci in 0..width {
            if data.count[ci] == 0 {
                missing += 1;
                continue;
            }
            if missing == 0 {
                continue;
            }

            let dx = missing + 1;
            if ci < dx {
                // Leading gap: nothing to interpolate from.
                for p in 0..ci {
                    let back = Decimal::from(ci - p);
                    data.min[p] = data.min[ci];
                    data.max[p] = data.max[ci];
                    data.avg[p] = data.avg[ci];
                    data.clock[p] = data.clock[ci] - step * back;
                }
            } else {
                let first = ci - dx;
                let span = Decimal::from(dx);
                for g in 1..dx {
                    let k = Decimal::from(g);
                    let lerp = |v: &[Decimal]| v[first] + k * (v[ci] - v[first]) / span;
                    let (min, max, avg, clock) =
                        (lerp(&data.min), lerp(&data.max), lerp(&data.avg), lerp(&data.clock));
                    data.min[first + g] = min;
                    data.max[first + g] = max;
                    data.avg[first + g] = avg;
                    data.clock[first + g] = clock;
                }
            }

            if force_count && dx * 20 < width {
                data.count[ci - missing] = 1;
            }
            missing = 0;
        }

        if missing > 0 && missing < width {
            let last = width - missing - 1;
            for g in 1..=missing {
                data.min[last + g] = data.min[last];
                data.max[last + g] = data.max[last];
                data.avg[last + g] = data.avg[last];
                data.clock[last + g] = data.clock[last] + step * Decimal::from(g);
            }
        }
    }
}

/// Shift every series by its nearest lower-indexed series on the same side.
/// Only the single nearest predecessor is used; its own shift already carries the chain.
pub fn apply_stacking(specs: &[SeriesSpec], data: &mut [SeriesData]) {
    for i in 1..data.len().min(specs.len()) {
        let side: AxisSide = specs[i].axis;
        let Some(j) = (0..i).rev().find(|&j| specs[j].axis == side) else {
            continue;
        };
        let (before, rest) = data.split_at_mut(i);
        let prev = &before[j];
        let cur = &mut rest[0];
        for c in 0..cur.width().min(prev.width()) {
            cur.shift_min[c] = prev.min[c] + prev.shift_min[c];
            cur.shift_max[c] = prev.max[c] + prev.shift_max[c];
            cur.shift_avg[c] = prev.avg[c] + prev.shift_avg[c];
        }
    }
}
