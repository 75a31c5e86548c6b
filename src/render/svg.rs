//! `plotters` drawing area as a [`Canvas`], and SVG file output.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontFamily, FontTransform};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;

use crate::config::GraphConfig;
use crate::render::primitive::{Anchor, Canvas, Point, Primitive, Stroke};
use crate::render::{RenderedGraph, render};
use crate::source::{ThresholdSource, TimeSeriesSource};
use crate::theme::Rgba;

/// Segments used to approximate a non-circular ellipse.
const ELLIPSE_SEGMENTS: usize = 24;

pub fn rgba_color(c: Rgba) -> RGBAColor {
    RGBAColor(c.r, c.g, c.b, c.opacity())
}

pub fn line_style(stroke: &Stroke) -> ShapeStyle {
    rgba_color(stroke.color).stroke_width(stroke.width)
}

pub fn fill_style(color: Rgba) -> ShapeStyle {
    rgba_color(color).filled()
}

/// Split a line into its dash segments.
pub fn dash_segments(from: Point, to: Point, on: u32, off: u32) -> Vec<((i32, i32), (i32, i32))> {
    let (dx, dy) = (f64::from(to.x - from.x), f64::from(to.y - from.y));
    let length = dx.hypot(dy);
    if length == 0.0 || on == 0 {
        return vec![((from.x, from.y), (to.x, to.y))];
    }
    let (on, period) = (f64::from(on), f64::from(on + off));
    let at = |d: f64| {
        let t = (d / length).min(1.0);
        ((f64::from(from.x) + dx * t).round() as i32, (f64::from(from.y) + dy * t).round() as i32)
    };

    let mut segments = Vec::new();
    let mut start = 0.0;
    while start < length {
        // Segments are inclusive of both end pixels.
        let end = (start + on - 1.0).min(length);
        segments.push((at(start), at(end)));
        start += period;
    }
    segments
}

/// Replays primitives onto a `plotters` drawing area. The first drawing error is kept and
/// returned by [`finish`](Self::finish).
pub struct PlottersCanvas<DB: DrawingBackend> {
    area: DrawingArea<DB, Shift>,
    error: Option<anyhow::Error>,
}

impl<DB: DrawingBackend> PlottersCanvas<DB> {
    pub fn new(area: DrawingArea<DB, Shift>) -> Self {
        Self { area, error: None }
    }

    /// Flush the backend, or report the first drawing error.
    pub fn finish(self) -> Result<()> {
        if let Some(e) = self.error {
            return Err(e);
        }
        self.area.present().map_err(|e| anyhow!("{:?}", e))
    }

    fn record<E: std::fmt::Debug>(&mut self, result: std::result::Result<(), E>) {
        if let Err(e) = result {
            if self.error.is_none() {
                self.error = Some(anyhow!("{:?}", e));
            }
        }
    }

    fn stroke_path(&mut self, points: Vec<(i32, i32)>, stroke: &Stroke) {
        match stroke.dash {
            Some(dash) => {
                for pair in points.windows(2) {
                    let (a, b) = (Point::from(pair[0]), Point::from(pair[1]));
                    for (s, e) in dash_segments(a, b, dash.on, dash.off) {
                        let r = self.area.draw(&PathElement::new(vec![s, e], line_style(stroke)));
                        self.record(r);
                    }
                }
            }
            None => {
                let r = self.area.draw(&PathElement::new(points, line_style(stroke)));
                self.record(r);
            }
        }
    }
}

impl<DB: DrawingBackend> Canvas for PlottersCanvas<DB> {
    fn draw(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Line { from, to, stroke } => {
                self.stroke_path(vec![(from.x, from.y), (to.x, to.y)], stroke);
            }
            Primitive::Polygon { points, fill, stroke } => {
                let pts: Vec<(i32, i32)> = points.iter().map(|p| (p.x, p.y)).collect();
                if let Some(fill) = fill {
                    let r = self.area.draw(&Polygon::new(pts.clone(), fill_style(*fill)));
                    self.record(r);
                }
                if let (Some(stroke), Some(first)) = (stroke, pts.first().copied()) {
                    let mut closed = pts;
                    closed.push(first);
                    self.stroke_path(closed, stroke);
                }
            }
            Primitive::Rect { top_left, bottom_right, fill, stroke } => {
                let corners = [(top_left.x, top_left.y), (bottom_right.x, bottom_right.y)];
                if let Some(fill) = fill {
                    let r = self.area.draw(&Rectangle::new(corners, fill_style(*fill)));
                    self.record(r);
                }
                if let Some(stroke) = stroke {
                    let r = self.area.draw(&Rectangle::new(corners, line_style(stroke)));
                    self.record(r);
                }
            }
            Primitive::Ellipse { center, width, height, fill, stroke } => {
                let (cx, cy) = (f64::from(center.x), f64::from(center.y));
                let (rx, ry) = (f64::from(*width) / 2.0, f64::from(*height) / 2.0);
                let outline: Vec<(i32, i32)> = (0..ELLIPSE_SEGMENTS)
                    .map(|i| {
                        let a = std::f64::consts::TAU * i as f64 / ELLIPSE_SEGMENTS as f64;
                        ((cx + rx * a.cos()).round() as i32, (cy + ry * a.sin()).round() as i32)
                    })
                    .collect();
                if let Some(fill) = fill {
                    let r = self.area.draw(&Polygon::new(outline.clone(), fill_style(*fill)));
                    self.record(r);
                }
                if let (Some(stroke), Some(first)) = (stroke, outline.first().copied()) {
                    let mut closed = outline;
                    closed.push(first);
                    self.stroke_path(closed, stroke);
                }
            }
            Primitive::Text { at, text, font_px, color, anchor, rotation_deg } => {
                let h_pos = match anchor {
                    Anchor::BaselineLeft => HPos::Left,
                    Anchor::BaselineCenter => HPos::Center,
                };
                let text_color = rgba_color(*color);
                let mut style = TextStyle::from((FontFamily::SansSerif, *font_px))
                    .color(&text_color)
                    .pos(Pos::new(h_pos, VPos::Bottom));
                style = match rotation_deg % 360 {
                    90 => style.transform(FontTransform::Rotate270),
                    180 => style.transform(FontTransform::Rotate180),
                    270 => style.transform(FontTransform::Rotate90),
                    _ => style,
                };
                let r = self.area.draw_text(text, &style, (at.x, at.y));
                self.record(r);
            }
        }
    }
}

/// Replay an already rendered graph into an SVG file.
pub fn write_svg<P: AsRef<Path>>(graph: &RenderedGraph, out_path: P) -> Result<()> {
    let out_path = out_path.as_ref();
    let area = SVGBackend::new(out_path, (graph.width, graph.height)).into_drawing_area();
    let mut canvas = PlottersCanvas::new(area);
    graph.replay(&mut canvas);
    canvas
        .finish()
        .with_context(|| format!("writing {}", out_path.display()))
}

/// Render a graph and write it as SVG.
pub fn render_svg<P: AsRef<Path>>(
    config: &GraphConfig,
    series: &dyn TimeSeriesSource,
    thresholds: &dyn ThresholdSource,
    out_path: P,
) -> Result<RenderedGraph> {
    let graph = render(config, series, thresholds)?;
    write_svg(&graph, out_path)?;
    Ok(graph)
}
