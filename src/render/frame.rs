//! Everything around the series: background, work-period shading, both grids, axes,
//! header and watermark.

use std::fmt::Display;

use chrono::{Datelike, TimeZone};
use log::warn;
use rust_decimal::Decimal;

use crate::axis::AxisSet;
use crate::config::GraphConfig;
use crate::context::{GRID_PIXELS, RenderContext, to_px};
use crate::models::AxisSide;
use crate::render::primitive::{Point, Primitive, Stroke};
use crate::render::text::{estimate_text_height_px, estimate_text_width_px};
use crate::theme::Rgba;
use crate::timegrid::{GridPlan, MAIN_LABEL_PX, SUB_LABEL_PX};
use crate::workperiod::{WORK_PERIOD_MAX_PERIOD, WorkSchedule};

const HEADER_FONT_PX: u32 = 11;
const HEADER_BASELINE_Y: i32 = 24;
const WATERMARK_FONT_PX: u32 = 8;
const GRID_DASH: (u32, u32) = (1, 2);
const ARROW_FILL: Rgba = Rgba::rgb(0xFF, 0xFF, 0xFF);

fn dashed(color: Rgba) -> Stroke {
    Stroke::dashed(color, 1, GRID_DASH.0, GRID_DASH.1)
}

pub struct FramePainter<'a> {
    ctx: &'a RenderContext,
}

impl<'a> FramePainter<'a> {
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self { ctx }
    }

    /// Image background and the centered title.
    pub fn background(&self, title: Option<&str>, out: &mut Vec<Primitive>) {
        let layout = &self.ctx.layout;
        let theme = &self.ctx.theme;
        out.push(Primitive::Rect {
            top_left: Point::new(0, 0),
            bottom_right: Point::new(layout.full_width - 1, layout.full_height - 1),
            fill: Some(theme.background),
            stroke: Some(Stroke::solid(theme.grid_border, 1)),
        });
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            let w = estimate_text_width_px(title, HEADER_FONT_PX) as i32;
            let x = ((layout.full_width - w) / 2).max(0);
            out.push(Primitive::text((x, HEADER_BASELINE_Y), title, HEADER_FONT_PX, theme.text));
        }
    }

    /// Plot area fill, and working-time shading for short enough windows.
    pub fn work_period<Tz: TimeZone>(&self, config: &GraphConfig, tz: &Tz, out: &mut Vec<Primitive>) {
        let layout = &self.ctx.layout;
        let theme = &self.ctx.theme;
        let x_left = layout.plot_left() + 1;
        let x_right = layout.plot_right() - 1;
        let (top, bottom) = (layout.plot_top(), layout.plot_bottom());
        out.push(Primitive::filled_rect((x_left, top), (x_right, bottom), theme.graph));

        if !config.show_work_period || self.ctx.window.period > WORK_PERIOD_MAX_PERIOD {
            return;
        }
        let schedule: WorkSchedule = match config.work_period.parse() {
            Ok(s) => s,
            Err(e) => {
                warn!("{e}; work period not shaded");
                return;
            }
        };

        out.push(Primitive::filled_rect((x_left, top), (x_right, bottom), theme.non_work_time));
        for (x1, x2) in schedule.pixel_spans(self.ctx, tz) {
            out.push(Primitive::filled_rect((x1, top), (x2 - 1, bottom), theme.graph));
        }
    }

    /// Start and end labels plus one dashed line and label per planned tick.
    pub fn time_grid<Tz>(&self, plan: &GridPlan, tz: &Tz, out: &mut Vec<Primitive>)
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let layout = &self.ctx.layout;
        let theme = &self.ctx.theme;
        let window = &self.ctx.window;

        let from = tz.timestamp_opt(window.from, 0).earliest();
        let to = tz.timestamp_opt(window.to(), 0).earliest();
        let edge_format = match (&from, &to) {
            (Some(f), Some(t)) if f.year() != t.year() => "%Y-%m-%d",
            _ => "%Y-%m-%d %H:%M",
        };

        if let Some(start) = &from {
            let label = start.format(edge_format).to_string();
            self.time_label(&label, MAIN_LABEL_PX, theme.highlight, 0, out);
        }
        for tick in &plan.ticks {
            let (font, color, line) = if tick.main {
                (MAIN_LABEL_PX, theme.highlight, theme.main_grid)
            } else {
                (SUB_LABEL_PX, theme.text, theme.grid)
            };
            self.time_label(&tick.label, font, color, tick.position, out);
            let x = layout.plot_left() + tick.position;
            out.push(Primitive::line((x, layout.plot_top()), (x, layout.plot_bottom()), dashed(line)));
        }
        if let Some(end) = &to {
            let label = end.format(edge_format).to_string();
            self.time_label(&label, MAIN_LABEL_PX, theme.highlight, layout.size_x, out);
        }
    }

    /// Rotated label whose right edge sits on the tick, text ending just under the X axis.
    fn time_label(&self, text: &str, font_px: u32, color: Rgba, position: i32, out: &mut Vec<Primitive>) {
        let layout = &self.ctx.layout;
        let w = estimate_text_height_px(font_px) as i32;
        let h = estimate_text_width_px(text, font_px) as i32;
        let x = layout.plot_left() + position + (w + 1) / 2;
        let y = layout.plot_bottom() + h + 6;
        out.push(Primitive::vertical_text((x, y), text, font_px, color));
    }

    /// Dashed value gridlines, spaced like the primary axis; twice as dense when the axis
    /// has few lines for the plot height.
    pub fn horizontal_grid(&self, axes: &AxisSet, out: &mut Vec<Primitive>) {
        let Some(axis) = axes.primary() else {
            return;
        };
        let layout = &self.ctx.layout;
        let mut step = axis.grid_step_px;
        let wanted = to_px(Decimal::from(layout.size_y) / Decimal::from(GRID_PIXELS));
        if i64::from(axis.gridline_count) < i64::from(wanted) {
            step /= Decimal::TWO;
        }
        if step < Decimal::ONE {
            return;
        }

        let top = Decimal::from(layout.plot_top());
        let stroke = dashed(self.ctx.theme.grid);
        let mut y = Decimal::from(layout.plot_bottom()) - step;
        while y > top {
            let row = to_px(y);
            out.push(Primitive::line((layout.plot_left(), row), (layout.plot_right(), row), stroke));
            y -= step;
        }
    }

    /// Y axes with arrow heads for sides that have series (a dashed border otherwise) and
    /// the X axis with its arrow.
    pub fn xy_axes(&self, config: &GraphConfig, out: &mut Vec<Primitive>) {
        let layout = &self.ctx.layout;
        let theme = &self.ctx.theme;
        let border = Stroke::solid(theme.grid_border, 1);
        let (top, bottom) = (layout.plot_top(), layout.plot_bottom());

        for side in AxisSide::BOTH {
            let x = match side {
                AxisSide::Left => layout.plot_left(),
                AxisSide::Right => layout.plot_right(),
            };
            if config.has_side(side) {
                out.push(Primitive::line((x, top - 5), (x, bottom + 4), border));
                out.push(Primitive::Polygon {
                    points: vec![Point::new(x - 3, top - 5), Point::new(x + 3, top - 5), Point::new(x, top - 10)],
                    fill: Some(ARROW_FILL),
                    stroke: Some(border),
                });
            } else {
                out.push(Primitive::line((x, top), (x, bottom), dashed(theme.grid)));
            }
        }

        let right = layout.plot_right();
        let axis_y = bottom + 1;
        out.push(Primitive::line((layout.plot_left() - 3, axis_y), (right + 5, axis_y), border));
        out.push(Primitive::Polygon {
            points: vec![
                Point::new(right + 5, axis_y - 3),
                Point::new(right + 5, axis_y + 3),
                Point::new(right + 10, axis_y),
            ],
            fill: Some(ARROW_FILL),
            stroke: Some(border),
        });
    }

    /// Small text in the bottom-right corner.
    pub fn watermark(&self, text: &str, out: &mut Vec<Primitive>) {
        let layout = &self.ctx.layout;
        let w = estimate_text_width_px(text, WATERMARK_FONT_PX) as i32;
        let at = (layout.full_width - w - 2, layout.full_height - 5);
        out.push(Primitive::text(at, text, WATERMARK_FONT_PX, self.ctx.theme.grid));
    }
}
