//! Per-render state shared by every stage: window, plot geometry, theme.
//!
//! A [`RenderContext`] is built once per `render()` call and passed by reference
//! through resampling, axis scaling, time-grid planning and drawing.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::models::{AxisSide, GraphType, TimeWindow};
use crate::theme::GraphTheme;
use crate::units::round_half_up;

/// Target spacing of vertical (time) gridlines, in pixels.
pub const GRID_PIXELS: i64 = 30;
/// Target spacing of horizontal (value) gridlines, in pixels.
pub const GRID_PIXELS_VERT: i64 = 40;
/// Room below the plot for rotated time labels before the legend starts.
pub const LEGEND_OFFSET_Y: i32 = 90;
pub const LEGEND_ROW_PX: i32 = 14;
pub const GRAPH_HEIGHT_MIN: i32 = 20;
/// Horizontal room reserved for an axis with labels, or for a bare border.
pub const AXIS_OFFSET_X: i32 = 85;
pub const NO_AXIS_OFFSET_X: i32 = 30;
/// Room above the plot for the title and axis arrows.
pub const TOP_OFFSET_Y: i32 = 35;

/// Plot geometry inside the outer image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub full_width: i32,
    pub full_height: i32,
    pub shift_x_left: i32,
    pub shift_x_right: i32,
    pub shift_y: i32,
    /// Plot width in pixels (= number of pixel columns).
    pub size_x: i32,
    /// Plot height in pixels.
    pub size_y: i32,
    pub draw_items_legend: bool,
    pub draw_extra_legend: bool,
}

impl Layout {
    /// Fit the plot into the configured outer size, reserving legend rows only while the
    /// plot stays at least [`GRAPH_HEIGHT_MIN`] pixels tall.
    pub fn compute(config: &GraphConfig, trigger_rows: usize) -> GraphResult<Layout> {
        let offset = |side: AxisSide| {
            if config.has_side(side) {
                AXIS_OFFSET_X
            } else {
                NO_AXIS_OFFSET_X
            }
        };
        let shift_x_left = offset(AxisSide::Left);
        let shift_x_right = offset(AxisSide::Right);
        let full_width = i32::try_from(config.width)
            .map_err(|_| GraphError::Config(format!("width {} too large", config.width)))?;
        let full_height = i32::try_from(config.height)
            .map_err(|_| GraphError::Config(format!("height {} too large", config.height)))?;

        let size_x = full_width - (shift_x_left + shift_x_right + 1);
        let mut size_y = full_height - (TOP_OFFSET_Y + LEGEND_OFFSET_Y);
        if size_x < 1 || size_y < 1 {
            return Err(GraphError::Config(format!(
                "{}x{} leaves no room for the plot area",
                config.width, config.height
            )));
        }

        let mut draw_items_legend = false;
        let mut draw_extra_legend = false;
        if config.show_legend {
            // N item rows plus the header row.
            let items_h = LEGEND_ROW_PX * (config.series.len() as i32 + 1);
            let triggers_h = LEGEND_ROW_PX * trigger_rows as i32;
            let percentile_h: i32 = if config.graph_type == GraphType::Normal {
                AxisSide::BOTH
                    .into_iter()
                    .filter(|s| config.percentile.side(*s) > Decimal::ZERO && config.has_side(*s))
                    .map(|_| LEGEND_ROW_PX)
                    .sum()
            } else {
                0
            };

            if size_y - items_h >= GRAPH_HEIGHT_MIN {
                size_y -= items_h;
                draw_items_legend = true;
                if size_y - triggers_h - percentile_h >= GRAPH_HEIGHT_MIN {
                    size_y -= triggers_h + percentile_h;
                    draw_extra_legend = true;
                }
            }
        }

        Ok(Layout {
            full_width,
            full_height,
            shift_x_left,
            shift_x_right,
            shift_y: TOP_OFFSET_Y,
            size_x,
            size_y,
            draw_items_legend,
            draw_extra_legend,
        })
    }

    pub fn plot_left(&self) -> i32 {
        self.shift_x_left
    }

    pub fn plot_right(&self) -> i32 {
        self.shift_x_left + self.size_x
    }

    pub fn plot_top(&self) -> i32 {
        self.shift_y
    }

    pub fn plot_bottom(&self) -> i32 {
        self.shift_y + self.size_y
    }
}

/// Everything a render stage needs to know about the current call.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub graph_type: GraphType,
    pub window: TimeWindow,
    pub layout: Layout,
    pub theme: GraphTheme,
}

impl RenderContext {
    /// Build a context directly from a window and plot size (no legend, default theme).
    pub fn for_plot(graph_type: GraphType, from: i64, period: i64, size_x: i32, size_y: i32) -> Self {
        let layout = Layout {
            full_width: size_x + AXIS_OFFSET_X + NO_AXIS_OFFSET_X + 1,
            full_height: size_y + TOP_OFFSET_Y + LEGEND_OFFSET_Y,
            shift_x_left: AXIS_OFFSET_X,
            shift_x_right: NO_AXIS_OFFSET_X,
            shift_y: TOP_OFFSET_Y,
            size_x,
            size_y,
            draw_items_legend: false,
            draw_extra_legend: false,
        };
        Self {
            graph_type,
            window: TimeWindow {
                from,
                period,
                pixel_width: size_x.max(0) as usize,
                tz_offset_diff: 0,
            },
            layout,
            theme: GraphTheme::default(),
        }
    }

    pub fn is_stacked(&self) -> bool {
        self.graph_type == GraphType::Stacked
    }

    pub fn columns(&self) -> usize {
        self.window.pixel_width
    }

    /// `x = plot_left + round((clock - from) * plot_width / period)`.
    pub fn time_to_x(&self, clock: Decimal) -> i32 {
        let offset = (clock - Decimal::from(self.window.from)) * Decimal::from(self.layout.size_x)
            / Decimal::from(self.window.period.max(1));
        self.layout.plot_left() + to_px(offset)
    }
}

/// Nearest device pixel, halves away from zero.
pub fn to_px(value: Decimal) -> i32 {
    round_half_up(value, 0).to_i32().unwrap_or(if value.is_sign_negative() { i32::MIN } else { i32::MAX })
}
