//! Y axis labels, long units captions and zero lines.

use rust_decimal::Decimal;

use crate::axis::{AxisSet, AxisState};
use crate::config::GraphConfig;
use crate::context::{RenderContext, to_px};
use crate::models::AxisSide;
use crate::render::primitive::{Primitive, Stroke};
use crate::render::text::{estimate_text_height_px, estimate_text_width_px};
use crate::units::{FormatOptions, common_pow, format_value, fraction_len};

const LABEL_FONT_PX: u32 = 8;
const UNITS_FONT_PX: u32 = 9;

/// Shared units of a side's series, or `""` when they disagree.
pub fn side_units(config: &GraphConfig, side: AxisSide) -> String {
    let mut units: Option<&str> = None;
    for spec in config.series.iter().filter(|s| s.axis == side) {
        match units {
            None => units = Some(spec.short_units()),
            Some(u) if u != spec.short_units() => return String::new(),
            Some(_) => {}
        }
    }
    units.unwrap_or_default().to_string()
}

/// Values that get a label: every gridline not within half a step of `max`, then `max`.
pub fn label_values(axis: &AxisState) -> Vec<Decimal> {
    let half = axis.step / Decimal::TWO;
    let mut values: Vec<Decimal> = (0..=axis.gridline_count.max(1))
        .map(|i| axis.min + axis.step * Decimal::from(i))
        .filter(|v| *v + half <= axis.max)
        .collect();
    values.push(axis.max);
    values
}

pub struct SidesPainter<'a> {
    ctx: &'a RenderContext,
}

impl<'a> SidesPainter<'a> {
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self { ctx }
    }

    pub fn paint(&self, config: &GraphConfig, axes: &AxisSet, out: &mut Vec<Primitive>) {
        for axis in axes.iter() {
            self.side(config, axis, out);
        }
    }

    fn side(&self, config: &GraphConfig, axis: &AxisState, out: &mut Vec<Primitive>) {
        let layout = &self.ctx.layout;
        let theme = &self.ctx.theme;
        let side = axis.side;
        let units = side_units(config, side);

        let long_units = config
            .series
            .iter()
            .filter(|s| s.axis == side)
            .find_map(|s| s.long_units());
        if let Some(long) = long_units {
            let w = estimate_text_height_px(UNITS_FONT_PX) as i32;
            let h = estimate_text_width_px(long, UNITS_FONT_PX) as i32;
            let mut y = layout.size_y / 2 + layout.plot_top() + h / 2;
            if y < h {
                y = h + 6;
            }
            let x = match side {
                AxisSide::Left => w + 8,
                AxisSide::Right => layout.full_width - w,
            };
            out.push(Primitive::vertical_text((x, y), long, UNITS_FONT_PX, theme.text));
        }

        let one = Decimal::ONE;
        let ignore_millis = axis.max.abs() >= one || axis.min.abs() >= one;
        let pow = common_pow(axis.min, axis.max, axis.byte_units);
        let values = label_values(axis);

        let length = if units == "s" {
            None
        } else {
            let bare = FormatOptions {
                byte_step: axis.byte_units,
                pow: Some(pow),
                prefix_without_units: true,
                ..FormatOptions::new("")
            };
            let texts: Vec<String> = values.iter().map(|v| format_value(*v, &bare)).collect();
            fraction_len(&texts)
        };
        let opts = FormatOptions {
            byte_step: axis.byte_units,
            pow: Some(pow),
            ignore_millis,
            length,
            prefix_without_units: true,
            ..FormatOptions::new(&units)
        };

        let label_x = |text: &str| match side {
            AxisSide::Left => {
                layout.plot_left() - estimate_text_width_px(text, LABEL_FONT_PX) as i32 - 9
            }
            AxisSide::Right => layout.plot_right() + 12,
        };

        let (gridline_values, max_value) = values.split_at(values.len() - 1);
        for (i, value) in gridline_values.iter().enumerate() {
            let text = format_value(*value, &opts);
            let y = layout.plot_bottom() - to_px(axis.grid_step_px * Decimal::from(i)) + 4;
            out.push(Primitive::text((label_x(&text), y), text, LABEL_FONT_PX, theme.text));
        }
        for value in max_value {
            let text = format_value(*value, &opts);
            out.push(Primitive::text((label_x(&text), layout.plot_top() + 4), text, LABEL_FONT_PX, theme.text));
        }

        if axis.zero_row_px != layout.plot_bottom() && axis.zero_row_px != layout.plot_top() {
            out.push(Primitive::line(
                (layout.plot_left(), axis.zero_row_px),
                (layout.plot_right(), axis.zero_row_px),
                Stroke::solid(theme.zero_line_color(side), 1),
            ));
        }
    }
}
