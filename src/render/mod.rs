//! The render pipeline: data in, an ordered list of drawing primitives out.
//!
//! Stages run in a fixed order on a per-call [`RenderContext`]:
//! 1. trigger selection (the legend needs its row count before layout)
//! 2. layout and time window
//! 3. fetching, gap filling and stacking
//! 4. axis scaling, percentiles, trigger placement and time-grid planning
//! 5. drawing, back to front, into [`Layer`]s
//!
//! The result can be replayed onto any [`Canvas`]; [`svg`] provides one backed by `plotters`.

pub mod frame;
pub mod legend;
pub mod overlays;
pub mod primitive;
pub mod series;
pub mod sides;
pub mod svg;
pub mod text;

use std::fmt::Display;

use chrono::{FixedOffset, Offset, TimeZone, Utc};
use log::{debug, info};
use serde::Serialize;

use crate::axis::{AxisScaler, AxisSet};
use crate::config::GraphConfig;
use crate::context::{Layout, RenderContext};
use crate::error::{GraphError, GraphResult};
use crate::models::TimeWindow;
use crate::overlay::{Percentile, PercentileCalculator, TriggerOverlay, TriggerOverlayCalculator};
use crate::resample::{SeriesData, SeriesResampler};
use crate::source::{ThresholdSource, TimeSeriesSource};
use crate::timegrid::{GridPlan, TimeGridPlanner};

pub use primitive::{Anchor, Canvas, Dash, Point, Primitive, Stroke};

use frame::FramePainter;
use legend::LegendPainter;
use series::SeriesPainter;
use sides::SidesPainter;

/// Drawing layers, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Background,
    WorkPeriod,
    TimeGrid,
    AxisScale,
    Series,
    AxisLabels,
    Overlays,
    Legend,
    Watermark,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerBlock {
    pub layer: Layer,
    pub primitives: Vec<Primitive>,
}

/// Result of one render call: the primitive stream grouped by layer, plus the computed
/// state it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedGraph {
    pub width: u32,
    pub height: u32,
    pub window: TimeWindow,
    pub axes: AxisSet,
    pub time_grid: GridPlan,
    pub percentiles: Vec<Percentile>,
    pub triggers: Vec<TriggerOverlay>,
    pub layers: Vec<LayerBlock>,
}

impl RenderedGraph {
    /// Every primitive in drawing order.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.layers.iter().flat_map(|l| l.primitives.iter())
    }

    pub fn layer(&self, layer: Layer) -> &[Primitive] {
        self.layers
            .iter()
            .find(|b| b.layer == layer)
            .map(|b| b.primitives.as_slice())
            .unwrap_or_default()
    }

    /// Draw every primitive, in order, onto `canvas`.
    pub fn replay(&self, canvas: &mut dyn Canvas) {
        for p in self.primitives() {
            canvas.draw(p);
        }
    }
}

/// Render in the fixed UTC offset of `config.utc_offset_secs`.
pub fn render(
    config: &GraphConfig,
    series: &dyn TimeSeriesSource,
    thresholds: &dyn ThresholdSource,
) -> GraphResult<RenderedGraph> {
    let tz = FixedOffset::east_opt(config.utc_offset_secs).ok_or_else(|| {
        GraphError::Config(format!("UTC offset {}s out of range", config.utc_offset_secs))
    })?;
    render_in(config, series, thresholds, &tz)
}

/// Render with an explicit time zone for labels, grid alignment and work-period shading.
pub fn render_in<Tz>(
    config: &GraphConfig,
    series: &dyn TimeSeriesSource,
    thresholds: &dyn ThresholdSource,
    tz: &Tz,
) -> GraphResult<RenderedGraph>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if config.period <= 0 {
        return Err(GraphError::Config(format!("period must be positive, got {}", config.period)));
    }
    let from = config.from.unwrap_or_else(|| Utc::now().timestamp() - config.period);

    let candidates = TriggerOverlayCalculator::new(config).select(thresholds)?;
    let layout = Layout::compute(config, candidates.len())?;
    let offset_at = |t: i64| {
        tz.timestamp_opt(t, 0)
            .earliest()
            .map(|dt| i64::from(dt.offset().fix().local_minus_utc()))
            .unwrap_or(0)
    };
    let window = TimeWindow {
        from,
        period: config.period,
        pixel_width: layout.size_x as usize,
        tz_offset_diff: offset_at(from) - offset_at(from + config.period),
    };
    let ctx = RenderContext {
        graph_type: config.graph_type,
        window,
        layout,
        theme: config.theme.clone(),
    };
    debug!(
        "plot {}x{} at ({}, {}), window {}..{}",
        layout.size_x,
        layout.size_y,
        layout.plot_left(),
        layout.plot_top(),
        window.from,
        window.to()
    );

    let raw = config
        .series
        .iter()
        .map(|spec| series.fetch(spec, &ctx.window))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let data = SeriesResampler::new(&ctx).run(&config.series, raw);

    let axes = AxisScaler::new(&ctx, config).scale(&data, series)?;
    let percentiles = PercentileCalculator::new(config).compute(&data);
    let triggers = TriggerOverlayCalculator::place(&candidates, &axes, &ctx.theme);
    let time_grid = TimeGridPlanner::new(&ctx, tz).plan();

    let layers = draw_layers(config, &ctx, tz, &data, &axes, &time_grid, &percentiles, &triggers);
    let graph = RenderedGraph {
        width: config.width,
        height: config.height,
        window,
        axes,
        time_grid,
        percentiles,
        triggers,
        layers,
    };
    info!(
        "rendered {} series into {} primitives",
        config.series.len(),
        graph.primitives().count()
    );
    Ok(graph)
}

#[allow(clippy::too_many_arguments)]
fn draw_layers<Tz>(
    config: &GraphConfig,
    ctx: &RenderContext,
    tz: &Tz,
    data: &[SeriesData],
    axes: &AxisSet,
    time_grid: &GridPlan,
    percentiles: &[Percentile],
    triggers: &[TriggerOverlay],
) -> Vec<LayerBlock>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let frame = FramePainter::new(ctx);
    let mut layers = Vec::with_capacity(9);
    let mut layer = |layer: Layer, draw: &mut dyn FnMut(&mut Vec<Primitive>)| {
        let mut primitives = Vec::new();
        draw(&mut primitives);
        layers.push(LayerBlock { layer, primitives });
    };

    layer(Layer::Background, &mut |out| frame.background(config.title.as_deref(), out));
    layer(Layer::WorkPeriod, &mut |out| frame.work_period(config, tz, out));
    layer(Layer::TimeGrid, &mut |out| frame.time_grid(time_grid, tz, out));
    layer(Layer::AxisScale, &mut |out| {
        frame.horizontal_grid(axes, out);
        frame.xy_axes(config, out);
    });
    layer(Layer::Series, &mut |out| {
        let painter = SeriesPainter::new(ctx);
        for (spec, d) in config.series.iter().zip(data) {
            if let Some(axis) = axes.get(spec.axis) {
                painter.paint(spec, d, axis, out);
            }
        }
    });
    layer(Layer::AxisLabels, &mut |out| SidesPainter::new(ctx).paint(config, axes, out));
    layer(Layer::Overlays, &mut |out| {
        overlays::trigger_lines(ctx, triggers, out);
        overlays::percentile_lines(ctx, axes, percentiles, out);
    });
    layer(Layer::Legend, &mut |out| {
        if config.show_legend {
            LegendPainter::new(ctx).paint(config, data, percentiles, triggers, out);
        }
    });
    layer(Layer::Watermark, &mut |out| {
        if let Some(text) = config.watermark.as_deref() {
            frame.watermark(text, out);
        }
    });
    layers
}
