//! Horizontal threshold and percentile lines across the plot.

use crate::axis::AxisSet;
use crate::context::RenderContext;
use crate::overlay::{Percentile, TriggerOverlay};
use crate::render::primitive::{Primitive, Stroke};

const TRIGGER_DASH: (u32, u32) = (5, 3);

/// Two-row dashed lines alternating the severity color and the opposite color.
pub fn trigger_lines(ctx: &RenderContext, triggers: &[TriggerOverlay], out: &mut Vec<Primitive>) {
    let layout = &ctx.layout;
    let (left, right) = (layout.plot_left(), layout.plot_right());
    for trigger in triggers.iter().filter(|t| !t.skipdraw) {
        for y in [trigger.y_px, trigger.y_px + 1] {
            out.push(Primitive::line((left, y), (right, y), Stroke::solid(ctx.theme.trigger_opposite, 1)));
            out.push(Primitive::line(
                (left, y),
                (right, y),
                Stroke::dashed(trigger.color, 1, TRIGGER_DASH.0, TRIGGER_DASH.1),
            ));
        }
    }
}

/// One solid line per percentile inside its axis range.
pub fn percentile_lines(ctx: &RenderContext, axes: &AxisSet, percentiles: &[Percentile], out: &mut Vec<Primitive>) {
    let layout = &ctx.layout;
    for p in percentiles {
        let Some(axis) = axes.get(p.side) else {
            continue;
        };
        if p.value < axis.min || p.value > axis.max {
            continue;
        }
        let y = axis.value_to_y(p.value);
        out.push(Primitive::line(
            (layout.plot_left(), y),
            (layout.plot_right(), y),
            Stroke::solid(ctx.theme.percentile_color(p.side), 1),
        ));
    }
}
