//! Y axis scaling: nice bounds, gridline step and the value to pixel mapping per side.
//!
//! Pipeline for every present side:
//! 1. raw extents from the bound modes and the resampled series
//! 2. degeneracy correction ([`correct_degenerate`])
//! 3. consistency between fixed and calculated bounds
//! 4. nice interval search, rounding and headroom (primary side first)
//! 5. the other side is forced onto the primary's gridline count
//! 6. fixed / item-value bounds restored, `min < max` validated
//!
//! All of it runs on [`Decimal`] so interval comparisons are exact.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::config::{Bound, GraphConfig};
use crate::context::{GRID_PIXELS_VERT, RenderContext, to_px};
use crate::error::{GraphError, GraphResult};
use crate::models::{AxisSide, CalcFn, SeriesSpec};
use crate::resample::{Orientation, SeriesData};
use crate::source::TimeSeriesSource;

/// Scaled state of one Y axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisState {
    pub side: AxisSide,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
    pub gridline_count: u32,
    /// Pixel row of `origin`.
    pub zero_row_px: i32,
    pub unit_per_px: Decimal,
    /// Value drawn at `zero_row_px`: 0 when the range straddles zero, else the bound nearest zero.
    pub origin: Decimal,
    /// Distance between gridlines in pixels.
    pub grid_step_px: Decimal,
    pub byte_units: bool,
    pub orientation: Orientation,
}

impl AxisState {
    /// Pixel row (fractional) of a value: `zero_row - (value - origin) / unit_per_px`.
    /// Rows that overflow saturate far outside the plot, on the side of the value.
    pub fn value_to_row(&self, value: Decimal) -> Decimal {
        value
            .checked_sub(self.origin)
            .and_then(|d| d.checked_div(self.unit_per_px))
            .and_then(|rows| Decimal::from(self.zero_row_px).checked_sub(rows))
            .unwrap_or(if value >= self.origin {
                Decimal::from(i32::MIN)
            } else {
                Decimal::from(i32::MAX)
            })
    }

    /// Same as [`value_to_row`](Self::value_to_row), rounded to a device row.
    pub fn value_to_y(&self, value: Decimal) -> i32 {
        to_px(self.value_to_row(value))
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value > self.min && value < self.max
    }
}

/// Both axes of one render. Absent sides have no series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSet {
    pub primary: AxisSide,
    pub left: Option<AxisState>,
    pub right: Option<AxisState>,
}

impl AxisSet {
    pub fn get(&self, side: AxisSide) -> Option<&AxisState> {
        match side {
            AxisSide::Left => self.left.as_ref(),
            AxisSide::Right => self.right.as_ref(),
        }
    }

    pub fn primary(&self) -> Option<&AxisState> {
        self.get(self.primary)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxisState> {
        self.left.iter().chain(self.right.iter())
    }
}

/// Interval candidates `{1,2,5} x 10^k`, k in -4..=18, ascending.
pub fn decimal_candidates() -> Vec<Decimal> {
    let mut out = Vec::with_capacity(69);
    for k in -4i32..=18 {
        let pow = pow10(k);
        for m in [1u32, 2, 5] {
            out.push(Decimal::from(m) * pow);
        }
    }
    out
}

/// Interval candidates for byte axes: the fractional decimal steps, then
/// `{1,2,5,10,20,50,100,200,500} x 1024^k`, k in 0..=6, ascending.
pub fn byte_candidates() -> Vec<Decimal> {
    let mut out = Vec::with_capacity(75);
    for k in -4i32..=-1 {
        let pow = pow10(k);
        for m in [1u32, 2, 5] {
            out.push(Decimal::from(m) * pow);
        }
    }
    let mut base = Decimal::ONE;
    for _ in 0..=6 {
        for m in [1u32, 2, 5, 10, 20, 50, 100, 200, 500] {
            out.push(Decimal::from(m) * base);
        }
        base *= Decimal::from(1024);
    }
    out
}

fn pow10(k: i32) -> Decimal {
    if k >= 0 {
        Decimal::from(10u64.pow(k.unsigned_abs()))
    } else {
        Decimal::new(1, k.unsigned_abs())
    }
}

/// Candidate closest to `desired`; the earliest wins on ties.
pub fn nearest_candidate(candidates: &[Decimal], desired: Decimal) -> Decimal {
    let mut best = candidates.last().copied().unwrap_or(Decimal::ONE);
    let mut dist = Decimal::from(5) * Decimal::from(10u64.pow(18));
    for &c in candidates {
        let t = (c - desired).abs();
        if t < dist {
            dist = t;
            best = c;
        }
    }
    best
}

/// Degeneracy rules for raw extents. `None` means no data on that bound.
pub fn correct_degenerate(
    min: Option<Decimal>,
    max: Option<Decimal>,
    orientation: Orientation,
) -> (Decimal, Decimal) {
    let mut min = min.unwrap_or(Decimal::ZERO);
    let mut max = max.unwrap_or(Decimal::ONE);

    if min == max {
        if orientation.is_negative() {
            max = Decimal::ZERO;
        } else if min.is_zero() {
            max = Decimal::ONE;
        } else {
            min = Decimal::ZERO;
        }
    } else if min > max {
        if orientation.is_negative() {
            min = max * Decimal::new(2, 1);
        } else {
            min = Decimal::ZERO;
        }
    }

    // A range within 10% of its own magnitude would render as a flat line.
    if !min.is_zero() && !max.is_zero() {
        let (lo, hi) = {
            let (a, b) = (min.abs(), max.abs());
            if b < a { (b, a) } else { (a, b) }
        };
        if (hi - lo) / hi <= Decimal::new(1, 1) {
            min *= if min > Decimal::ZERO { Decimal::new(95, 2) } else { Decimal::new(105, 2) };
            max *= if max > Decimal::ZERO { Decimal::new(105, 2) } else { Decimal::new(95, 2) };
        }
    }
    (min, max)
}

fn floor_to(value: Decimal, step: Decimal) -> Decimal {
    (value / step).floor() * step
}

fn ceil_to(value: Decimal, step: Decimal) -> Decimal {
    (value / step).ceil() * step
}

fn validate(side: AxisSide, min: Decimal, max: Decimal) -> GraphResult<()> {
    if min >= max {
        return Err(GraphError::AxisRange { side, min, max });
    }
    Ok(())
}

/// How a bound ended up being resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Resolved {
    Calculated,
    Fixed(Decimal),
    Item(Decimal),
}

impl Resolved {
    fn value(self) -> Option<Decimal> {
        match self {
            Resolved::Calculated => None,
            Resolved::Fixed(v) | Resolved::Item(v) => Some(v),
        }
    }
}

/// Per-side working values while scaling.
#[derive(Debug, Clone)]
struct SideWork {
    side: AxisSide,
    min_mode: Resolved,
    max_mode: Resolved,
    min: Decimal,
    max: Decimal,
    byte_units: bool,
    orientation: Orientation,
}

impl SideWork {
    fn candidates(&self) -> Vec<Decimal> {
        if self.byte_units {
            byte_candidates()
        } else {
            decimal_candidates()
        }
    }
}

/// Computes [`AxisSet`] for one render.
pub struct AxisScaler<'a> {
    ctx: &'a RenderContext,
    config: &'a GraphConfig,
}

impl<'a> AxisScaler<'a> {
    pub fn new(ctx: &'a RenderContext, config: &'a GraphConfig) -> Self {
        Self { ctx, config }
    }

    pub fn scale(
        &self,
        data: &[SeriesData],
        source: &dyn TimeSeriesSource,
    ) -> GraphResult<AxisSet> {
        let specs = &self.config.series;
        let sides = self.config.sides();
        let primary = if sides.contains(&AxisSide::Left) {
            AxisSide::Left
        } else {
            AxisSide::Right
        };

        let mut work: Vec<SideWork> = Vec::with_capacity(2);
        for side in sides {
            work.push(self.raw_extents(side, specs, data, source)?);
        }
        for w in &mut work {
            self.reconcile_modes(w)?;
        }

        let size_y = Decimal::from(self.ctx.layout.size_y);
        let tmp: Vec<(Decimal, Decimal)> = work.iter().map(|w| (w.min, w.max)).collect();

        let Some(pi) = work.iter().position(|w| w.side == primary) else {
            return Err(GraphError::Config("no primary axis".to_string()));
        };
        let oi = work.iter().position(|w| w.side != primary);

        // Primary side.
        let (p_min, p_max, p_step, p_count) = {
            let w = &work[pi];
            let candidates = w.candidates();
            let desired = Decimal::from(GRID_PIXELS_VERT) * (w.max - w.min) / size_y;
            let step = nearest_candidate(&candidates, desired);
            let (min, max) = round_with_headroom(w.min, w.max, step);
            let count = ((max - min) / step).ceil();
            (min, min + step * count, step, count)
        };
        debug!("primary {primary} axis: min={p_min} max={p_max} step={p_step} lines={p_count}");

        let mut steps = vec![Decimal::ZERO; work.len()];
        steps[pi] = p_step;
        work[pi].min = p_min;
        work[pi].max = p_max;

        // Other side: independent nice range, then forced onto the primary's line count.
        if let Some(oi) = oi {
            let w = &work[oi];
            let candidates = w.candidates();
            let desired = Decimal::from(GRID_PIXELS_VERT) * (w.max - w.min) / size_y;
            let own = nearest_candidate(&candidates, desired);
            let (mut min, mut max) = round_with_headroom(w.min, w.max, own);

            let first_fit = |min: Decimal, max: Decimal, fallback: Decimal| {
                let dist = max - min;
                candidates
                    .iter()
                    .copied()
                    .find(|c| dist < p_count * *c)
                    .unwrap_or(fallback)
            };
            let mut step = first_fit(min, max, Decimal::ONE);
            min = floor_to(min, step);
            max = ceil_to(max, step);

            let (tmp_min, tmp_max) = tmp[oi];
            if tmp_max > max || tmp_min < min {
                step = first_fit(min, max, step);
                min = floor_to(min, step);
            }
            max = min + step * p_count;
            debug!("{} axis aligned: min={min} max={max} step={step}", w.side);

            steps[oi] = step;
            work[oi].min = min;
            work[oi].max = max;
        }

        let mut set = AxisSet { primary, left: None, right: None };
        for (i, w) in work.iter().enumerate() {
            let (tmp_min, tmp_max) = tmp[i];
            let mut min = w.min;
            let mut max = w.max;
            if self.ctx.is_stacked() {
                min = tmp_min.min(Decimal::ZERO);
            }
            match w.max_mode {
                Resolved::Fixed(v) => max = v,
                Resolved::Item(_) => max = tmp_max,
                Resolved::Calculated => {}
            }
            match w.min_mode {
                Resolved::Fixed(v) => min = v,
                Resolved::Item(_) => min = tmp_min,
                Resolved::Calculated => {}
            }
            validate(w.side, min, max)?;

            let step = steps[i];
            let gridline_count = ((max - min) / step).ceil().to_u32().unwrap_or(0);
            let state = self.finish_side(w, min, max, step, gridline_count);
            match w.side {
                AxisSide::Left => set.left = Some(state),
                AxisSide::Right => set.right = Some(state),
            }
        }
        Ok(set)
    }

    fn raw_extents(
        &self,
        side: AxisSide,
        specs: &[SeriesSpec],
        data: &[SeriesData],
        source: &dyn TimeSeriesSource,
    ) -> GraphResult<SideWork> {
        let bounds = self.config.y_axis.side(side);
        let on_side: Vec<(&SeriesSpec, &SeriesData)> = specs
            .iter()
            .zip(data)
            .filter(|(s, d)| s.axis == side && d.has_data)
            .collect();

        let orientation = on_side
            .iter()
            .filter_map(|(_, d)| d.known_min)
            .fold(Orientation::Unknown, Orientation::observe);
        let byte_units = specs.iter().any(|s| s.axis == side && s.is_byte_units());

        let min_mode = resolve(&bounds.min, source)?;
        let max_mode = resolve(&bounds.max, source)?;
        let stacked = self.ctx.is_stacked();

        let raw_min = min_mode.value().or_else(|| {
            on_side
                .iter()
                .filter_map(|(spec, d)| {
                    let (vals, shifts) = match spec.calc_fn {
                        CalcFn::All | CalcFn::Min => (&d.min, &d.shift_min),
                        CalcFn::Max => (&d.max, &d.shift_max),
                        CalcFn::Avg => (&d.avg, &d.shift_avg),
                    };
                    vals.iter()
                        .zip(shifts)
                        .map(|(v, s)| if stacked && *s < Decimal::ZERO { *v + *s } else { *v })
                        .min()
                })
                .min()
        });

        let raw_max = max_mode.value().or_else(|| {
            on_side
                .iter()
                .filter_map(|(spec, d)| {
                    let (vals, shifts) = match spec.calc_fn {
                        CalcFn::All | CalcFn::Max => (&d.max, &d.shift_max),
                        CalcFn::Min => (&d.min, &d.shift_min),
                        CalcFn::Avg => (&d.avg, &d.shift_avg),
                    };
                    vals.iter()
                        .zip(shifts)
                        .zip(&d.count)
                        .map(|((v, s), c)| if *c != 0 { *v + *s } else { *v })
                        .max()
                })
                .max()
        });

        let (min, max) = correct_degenerate(raw_min, raw_max, orientation);
        debug!("{side} axis raw extents: {raw_min:?}..{raw_max:?} -> {min}..{max}");
        Ok(SideWork { side, min_mode, max_mode, min, max, byte_units, orientation })
    }

    /// Make a one-sided fixed bound consistent with the calculated one.
    fn reconcile_modes(&self, w: &mut SideWork) -> GraphResult<()> {
        let min_fixed = matches!(w.min_mode, Resolved::Fixed(_));
        let min_calc = w.min_mode == Resolved::Calculated;
        let max_calc = w.max_mode == Resolved::Calculated;

        if self.ctx.is_stacked() && !(min_fixed && max_calc) {
            w.min = w.min.min(Decimal::ZERO);
            return validate(w.side, w.min, w.max);
        }

        if let Resolved::Fixed(v) = w.max_mode {
            w.max = v;
            if min_calc && w.min >= w.max {
                w.min = if w.max.is_zero() {
                    Decimal::NEGATIVE_ONE
                } else if w.max > Decimal::ZERO {
                    w.max * Decimal::new(8, 1)
                } else {
                    w.max * Decimal::new(12, 1)
                };
            }
        }
        if let Resolved::Fixed(v) = w.min_mode {
            w.min = v;
            if max_calc && w.max <= w.min {
                w.max = if w.min > Decimal::ZERO {
                    w.min * Decimal::new(12, 1)
                } else {
                    w.min * Decimal::new(8, 1)
                };
            }
        }
        validate(w.side, w.min, w.max)
    }

    fn finish_side(
        &self,
        w: &SideWork,
        min: Decimal,
        max: Decimal,
        step: Decimal,
        gridline_count: u32,
    ) -> AxisState {
        let layout = &self.ctx.layout;
        let size_y = Decimal::from(layout.size_y);
        let range = max - min;

        let mut unit_per_px = range / size_y;
        if unit_per_px.is_zero() {
            unit_per_px = Decimal::ONE;
        }
        let (zero_row_px, origin) = if min > Decimal::ZERO {
            (layout.plot_bottom(), min)
        } else if max < Decimal::ZERO {
            (layout.plot_top(), max)
        } else {
            let rows = (min.abs() / unit_per_px).trunc().to_i32().unwrap_or(0);
            (layout.plot_bottom() - rows, Decimal::ZERO)
        };
        let grid_step_px = if range.is_zero() { step * size_y } else { step * size_y / range };

        AxisState {
            side: w.side,
            min,
            max,
            step,
            gridline_count,
            zero_row_px,
            unit_per_px,
            origin,
            grid_step_px,
            byte_units: w.byte_units,
            orientation: w.orientation,
        }
    }
}

fn resolve(bound: &Bound, source: &dyn TimeSeriesSource) -> GraphResult<Resolved> {
    Ok(match bound {
        Bound::Calculated => Resolved::Calculated,
        Bound::Fixed(v) => Resolved::Fixed(*v),
        Bound::ItemValue(item) => match source.last_value(item)? {
            Some(v) => Resolved::Item(v),
            None => Resolved::Calculated,
        },
    })
}

/// Round outward to `step`; a bound that was already on a multiple gets one extra step.
fn round_with_headroom(min: Decimal, max: Decimal, step: Decimal) -> (Decimal, Decimal) {
    let mut lo = floor_to(min, step);
    let mut hi = ceil_to(max, step);
    if lo == min && !lo.is_zero() {
        lo -= step;
    }
    if hi == max && !hi.is_zero() {
        hi += step;
    }
    (lo, hi)
}
