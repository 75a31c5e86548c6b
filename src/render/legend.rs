//! Legend below the plot: one row per series, then percentile and trigger rows.
//!
//! Rows are 14px apart and start [`LEGEND_OFFSET_Y`] below the plot, leaving room for the
//! rotated time labels. Columns are sized from the estimated width of their widest cell.

use rust_decimal::Decimal;

use crate::config::GraphConfig;
use crate::context::{LEGEND_OFFSET_Y, LEGEND_ROW_PX, RenderContext};
use crate::models::{AxisSide, GraphType};
use crate::overlay::{Percentile, TriggerOverlay};
use crate::render::primitive::{Point, Primitive, Stroke};
use crate::render::text::{estimate_text_width_px, truncate_to_width};
use crate::resample::SeriesData;
use crate::stats::series_summary;
use crate::theme::{Rgba, SERIES_ALPHA};
use crate::units::{FormatOptions, format_value};

pub const LEGEND_FONT_PX: u32 = 9;
const LEFT_X: i32 = 10;
const EXTRA_X: i32 = 25;
const MARKER_X: i32 = 15;
const SQUARE_PX: i32 = 11;
const COLUMN_GAP: i32 = 10;
const OUTLINE: Rgba = Rgba::rgb(0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

/// A text table anchored at `(x, first_baseline)`.
struct TextTable {
    x: i32,
    first_baseline: i32,
    rows: Vec<Vec<(String, Align)>>,
}

impl TextTable {
    fn new(x: i32, first_baseline: i32) -> Self {
        Self { x, first_baseline, rows: Vec::new() }
    }

    fn add_row(&mut self, cells: Vec<(String, Align)>) {
        self.rows.push(cells);
    }

    fn draw(&self, color: Rgba, out: &mut Vec<Primitive>) {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0i32; columns];
        for row in &self.rows {
            for (c, (text, _)) in row.iter().enumerate() {
                widths[c] = widths[c].max(estimate_text_width_px(text, LEGEND_FONT_PX) as i32);
            }
        }

        for (r, row) in self.rows.iter().enumerate() {
            let y = self.first_baseline + LEGEND_ROW_PX * r as i32;
            let mut x = self.x;
            for (c, (text, align)) in row.iter().enumerate() {
                let w = estimate_text_width_px(text, LEGEND_FONT_PX) as i32;
                let at = match align {
                    Align::Left => x,
                    Align::Center => x + (widths[c] - w) / 2,
                    Align::Right => x + widths[c] - w,
                };
                if !text.is_empty() {
                    out.push(Primitive::text((at, y), text.as_str(), LEGEND_FONT_PX, color));
                }
                x += widths[c] + COLUMN_GAP;
            }
        }
    }
}

pub struct LegendPainter<'a> {
    ctx: &'a RenderContext,
}

impl<'a> LegendPainter<'a> {
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self { ctx }
    }

    pub fn paint(
        &self,
        config: &GraphConfig,
        data: &[SeriesData],
        percentiles: &[Percentile],
        triggers: &[TriggerOverlay],
        out: &mut Vec<Primitive>,
    ) {
        let layout = &self.ctx.layout;
        if !layout.draw_items_legend {
            return;
        }
        let theme = &self.ctx.theme;
        let top = layout.plot_bottom() + LEGEND_OFFSET_Y;
        let row_y = |row: usize| top + LEGEND_ROW_PX * row as i32;
        let name_max_px = (layout.full_width / 3).max(40) as u32;

        let mut items = TextTable::new(LEFT_X + SQUARE_PX + 5, top + 4);
        let blank = || (String::new(), Align::Left);
        items.add_row(vec![
            blank(),
            blank(),
            ("last".to_string(), Align::Center),
            ("min".to_string(), Align::Center),
            ("avg".to_string(), Align::Center),
            ("max".to_string(), Align::Center),
        ]);

        let order: Vec<usize> = if config.graph_type == GraphType::Stacked {
            (0..config.series.len()).rev().collect()
        } else {
            (0..config.series.len()).collect()
        };
        let mut side_units: [Option<&str>; 2] = [None, None];

        for (row, &i) in order.iter().enumerate() {
            let spec = &config.series[i];
            let y = row_y(row + 1);
            out.push(Primitive::Rect {
                top_left: Point::new(LEFT_X, y - 5),
                bottom_right: Point::new(LEFT_X + SQUARE_PX - 1, y + 5),
                fill: Some(spec.color.with_alpha(SERIES_ALPHA)),
                stroke: Some(Stroke::solid(OUTLINE, 1)),
            });

            let name = (truncate_to_width(&spec.name, LEGEND_FONT_PX, name_max_px), Align::Left);
            let summary = data.get(i).and_then(|d| series_summary(spec, d));
            match summary {
                Some(s) => {
                    side_units[side_index(spec.axis)] = Some(spec.short_units());
                    let opts = FormatOptions::new(spec.short_units());
                    let fmt = |v: Decimal| (format_value(v, &opts), Align::Right);
                    let last = s.last.map(fmt).unwrap_or_else(|| ("-".to_string(), Align::Right));
                    items.add_row(vec![
                        name,
                        (format!("[{}]", spec.calc_fn.label()), Align::Left),
                        last,
                        fmt(s.min),
                        fmt(s.avg),
                        fmt(s.max),
                    ]);
                }
                None => items.add_row(vec![name, ("[no data]".to_string(), Align::Left)]),
            }
        }
        items.draw(theme.text, out);

        if !layout.draw_extra_legend {
            return;
        }
        let mut row = order.len() + 1;

        if config.graph_type == GraphType::Normal {
            let mut table = TextTable::new(EXTRA_X, row_y(row) + 4);
            for side in AxisSide::BOTH {
                let percent = config.percentile.side(side);
                if percent <= Decimal::ZERO || !config.has_side(side) {
                    continue;
                }
                let units = side_units[side_index(side)].unwrap_or_default();
                let value = percentiles
                    .iter()
                    .find(|p| p.side == side)
                    .map(|p| format_value(p.value, &FormatOptions::new(units)))
                    .unwrap_or_else(|| "-".to_string());
                table.add_row(vec![(
                    format!("{}th percentile: {value} ({side})", percent.normalize()),
                    Align::Left,
                )]);

                let y = row_y(row);
                out.push(Primitive::Polygon {
                    points: vec![
                        Point::new(MARKER_X + 5, y + 5),
                        Point::new(MARKER_X - 5, y + 5),
                        Point::new(MARKER_X, y - 5),
                    ],
                    fill: Some(theme.percentile_color(side)),
                    stroke: Some(Stroke::solid(OUTLINE, 1)),
                });
                row += 1;
            }
            table.draw(theme.text, out);
        }

        let mut table = TextTable::new(EXTRA_X, row_y(row) + 4);
        for trigger in triggers {
            out.push(Primitive::Ellipse {
                center: Point::new(MARKER_X, row_y(row)),
                width: 10,
                height: 10,
                fill: Some(trigger.color),
                stroke: Some(Stroke::solid(OUTLINE, 1)),
            });
            table.add_row(vec![
                (trigger.description.clone(), Align::Left),
                (trigger.constant.clone(), Align::Left),
            ]);
            row += 1;
        }
        table.draw(theme.text, out);
    }
}

fn side_index(side: AxisSide) -> usize {
    match side {
        AxisSide::Left => 0,
        AxisSide::Right => 1,
    }
}
