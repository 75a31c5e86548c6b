//! linegraph
//!
//! Turns per-pixel-column aggregates of monitoring time series into a time-gridded,
//! axis-scaled line/area graph, expressed as an ordered stream of drawing primitives.
//! Pairs with the `linegraph` CLI, which renders JSON scenes to SVG.
//!
//! ### Features
//! - Gap filling by interpolation, stacking, and per-side Y axis scaling on nice intervals
//! - Calendar-aware time grid with main/sub ticks and label formats
//! - Percentile and threshold ("trigger") overlays, work-period shading and a legend
//! - A backend-independent [`Canvas`] seam, with an SVG canvas built on `plotters`
//!
//! ### Example
//! ```no_run
//! use linegraph::{GraphConfig, MemorySource, SeriesSpec, Rgba};
//! use rust_decimal::Decimal;
//!
//! let mut source = MemorySource::new();
//! for i in 0..60 {
//!     source.push_sample("cpu", 1_700_000_000 + i * 60, Decimal::from(i % 7));
//! }
//! let config = GraphConfig {
//!     from: Some(1_700_000_000),
//!     period: 3600,
//!     series: vec![SeriesSpec::new("cpu", Rgba::rgb(0, 160, 0)).with_units("%")],
//!     ..GraphConfig::default()
//! };
//! linegraph::render::svg::render_svg(&config, &source, &source, "cpu.svg")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod axis;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod overlay;
pub mod render;
pub mod resample;
pub mod source;
pub mod stats;
pub mod storage;
pub mod theme;
pub mod timegrid;
pub mod units;
pub mod workperiod;

pub use config::GraphConfig;
pub use error::{GraphError, GraphResult};
pub use models::{AxisSide, CalcFn, DrawKind, GraphType, ItemRef, SeriesSpec};
pub use render::{Canvas, Layer, Primitive, RenderedGraph, render, render_in};
pub use source::{MemorySource, NoThresholds, ThresholdSource, TimeSeriesSource};
pub use theme::Rgba;
