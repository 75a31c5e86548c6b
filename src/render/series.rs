//! Series drawing: one element per pair of neighbouring known columns.

use rust_decimal::Decimal;

use crate::axis::AxisState;
use crate::context::{RenderContext, to_px};
use crate::models::{CalcFn, DrawKind, SeriesSpec};
use crate::resample::SeriesData;
use crate::render::primitive::{Point, Primitive, Stroke};
use crate::theme::{Rgba, SERIES_ALPHA};

/// Gap limit in pixel columns when columns are wider than the collection delay.
pub const MAX_SKIP_CELL: i64 = 16;
/// Gap limit in collection delays otherwise.
pub const MAX_SKIP_DELAY: i64 = 4;

const GRADIENT_ALPHA: u8 = 64;

/// Clamp a segment's rows into `[top, bottom]`. Returns false when the segment lies
/// entirely beyond one edge and the draw kind does not keep such segments.
pub fn limit_to_bounds(
    y1: &mut Decimal,
    y2: &mut Decimal,
    top: Decimal,
    bottom: Decimal,
    kind: DrawKind,
) -> bool {
    let both_below = *y1 > bottom && *y2 > bottom;
    let both_above = *y1 < top && *y2 < top;
    if (both_below || both_above) && !kind.is_region() {
        return false;
    }
    *y1 = clamp_row(*y1, top, bottom).0;
    *y2 = clamp_row(*y2, top, bottom).0;
    true
}

/// Row clamped into the band, and whether it had to move.
fn clamp_row(y: Decimal, top: Decimal, bottom: Decimal) -> (Decimal, bool) {
    if y > bottom {
        (bottom, true)
    } else if y < top {
        (top, true)
    } else {
        (y, false)
    }
}

/// Colors of one series' element.
struct Palette {
    avg: Rgba,
    min: Rgba,
    max: Rgba,
    min_max: Rgba,
}

pub struct SeriesPainter<'a> {
    ctx: &'a RenderContext,
}

impl<'a> SeriesPainter<'a> {
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self { ctx }
    }

    /// Walk the columns left to right, connecting each known column with the previous one.
    /// With a collection delay, segments spanning a too-long gap are skipped; a second
    /// skip in a row draws a bold dot instead.
    pub fn paint(&self, spec: &SeriesSpec, data: &SeriesData, axis: &AxisState, out: &mut Vec<Primitive>) {
        let width = data.width();
        if !data.has_data || width < 2 {
            return;
        }
        let theme = &self.ctx.theme;
        let palette = Palette {
            avg: spec.color.with_alpha(SERIES_ALPHA),
            min: theme.value_min.with_alpha(SERIES_ALPHA),
            max: theme.value_max.with_alpha(SERIES_ALPHA),
            min_max: theme.value_min_max.with_alpha(SERIES_ALPHA),
        };
        let cell = Decimal::from(self.ctx.window.period) / Decimal::from(width);

        let mut prev_draw = true;
        let mut j = 0;
        for i in 1..width {
            if data.count[i] == 0 && i != width - 1 {
                continue;
            }

            let mut draw = match spec.delay {
                Some(delay) if delay > 0 => {
                    let diff = (data.clock[i] - data.clock[j]).abs();
                    let delay = Decimal::from(delay);
                    if cell > delay {
                        diff < Decimal::from(MAX_SKIP_CELL) * cell
                    } else {
                        diff < Decimal::from(MAX_SKIP_DELAY) * delay
                    }
                }
                _ => true,
            };

            let kind = if !draw && !prev_draw {
                draw = true;
                DrawKind::BoldDot
            } else {
                prev_draw = draw;
                spec.draw_kind
            };

            if draw {
                self.element(spec.calc_fn, kind, data, axis, &palette, i, j, out);
            }
            j = i;
        }
    }

    /// Draw the element between column `cur` and the previous known column `prev`.
    #[allow(clippy::too_many_arguments)]
    fn element(
        &self,
        calc_fn: CalcFn,
        kind: DrawKind,
        data: &SeriesData,
        axis: &AxisState,
        palette: &Palette,
        cur: usize,
        prev: usize,
        out: &mut Vec<Primitive>,
    ) {
        let layout = &self.ctx.layout;
        let top = Decimal::from(layout.plot_top());
        let bottom = Decimal::from(layout.plot_bottom());

        let x1 = self.ctx.time_to_x(data.clock[cur]);
        let x2 = self.ctx.time_to_x(data.clock[prev]);
        let row = |values: &[Decimal], shifts: &[Decimal], c: usize| axis.value_to_row(values[c] + shifts[c]);

        let values = data.values(calc_fn);
        let shifts = data.shifts(calc_fn);
        let mut y1 = row(values, shifts, cur);
        let mut y2 = row(values, shifts, prev);

        // Stacking baseline; an unshifted series sits on the zero row.
        let baseline = |c: usize| {
            let shift = shifts[c];
            if shift.is_zero() { Decimal::from(axis.zero_row_px) } else { axis.value_to_row(shift) }
        };
        let mut y1s = baseline(cur);
        let mut y2s = baseline(prev);

        if !limit_to_bounds(&mut y1, &mut y2, top, bottom, kind)
            || !limit_to_bounds(&mut y1s, &mut y2s, top, bottom, kind)
        {
            return;
        }

        if calc_fn == CalcFn::All {
            let (y1max, c1x) = clamp_row(row(&data.max, &data.shift_max, cur), top, bottom);
            let (y2max, c2x) = clamp_row(row(&data.max, &data.shift_max, prev), top, bottom);
            let (y1min, c1n) = clamp_row(row(&data.min, &data.shift_min, cur), top, bottom);
            let (y2min, c2n) = clamp_row(row(&data.min, &data.shift_min, prev), top, bottom);

            if matches!(kind, DrawKind::Line | DrawKind::BoldLine) {
                let width = if kind == DrawKind::BoldLine { 2 } else { 1 };
                out.push(Primitive::filled_polygon(
                    vec![
                        Point::new(x1, to_px(y1max)),
                        Point::new(x1, to_px(y1min)),
                        Point::new(x2, to_px(y2min)),
                        Point::new(x2, to_px(y2max)),
                    ],
                    palette.min_max,
                ));
                if !c1x || !c2x {
                    out.push(Primitive::line(
                        (x1, to_px(y1max)),
                        (x2, to_px(y2max)),
                        Stroke::solid(palette.max, width),
                    ));
                }
                if !c1n || !c2n {
                    out.push(Primitive::line(
                        (x1, to_px(y1min)),
                        (x2, to_px(y2min)),
                        Stroke::solid(palette.min, width),
                    ));
                }
            }
        }

        let (y1, y2, y1s, y2s) = (to_px(y1), to_px(y2), to_px(y1s), to_px(y2s));
        let color = palette.avg;

        match kind {
            DrawKind::Line => out.push(Primitive::line((x1, y1), (x2, y2), Stroke::solid(color, 1))),
            DrawKind::BoldLine => out.push(Primitive::line((x1, y1), (x2, y2), Stroke::solid(color, 2))),
            DrawKind::DashedLine => {
                out.push(Primitive::line((x1, y1), (x2, y2), Stroke::dashed(color, 1, 2, 2)))
            }
            DrawKind::FilledRegion => out.push(Primitive::filled_polygon(
                vec![
                    Point::new(x1, y1),
                    Point::new(x1, y1s),
                    Point::new(x2, y2s),
                    Point::new(x2, y2),
                ],
                color,
            )),
            DrawKind::Dot => out.push(Primitive::filled_rect((x1 - 1, y1 - 1), (x1, y1), color)),
            DrawKind::BoldDot => {
                out.push(Primitive::filled_rect((x2 - 1, y2 - 1), (x2 + 1, y2 + 1), color))
            }
            DrawKind::GradientLine => {
                let floor = layout.plot_bottom();
                out.push(Primitive::filled_polygon(
                    vec![
                        Point::new(x1, y1),
                        Point::new(x2, y2),
                        Point::new(x2, floor),
                        Point::new(x1, floor),
                    ],
                    color.with_alpha(GRADIENT_ALPHA),
                ));
                out.push(Primitive::line((x1, y1), (x2, y2), Stroke::solid(color, 1)));
                out.push(Primitive::line((x1, y1 - 1), (x2, y2 - 1), Stroke::solid(color, 1)));
            }
        }
    }
}
