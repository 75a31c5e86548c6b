use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::theme::Rgba;

/// Opaque reference to a monitored item, as understood by the sources.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemRef(pub String);

impl ItemRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which Y axis a series is scaled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    #[default]
    Left,
    Right,
}

impl AxisSide {
    pub const BOTH: [AxisSide; 2] = [AxisSide::Left, AxisSide::Right];

    pub fn other(self) -> AxisSide {
        match self {
            AxisSide::Left => AxisSide::Right,
            AxisSide::Right => AxisSide::Left,
        }
    }
}

impl fmt::Display for AxisSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisSide::Left => f.write_str("left"),
            AxisSide::Right => f.write_str("right"),
        }
    }
}

/// Which per-column aggregate a series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalcFn {
    Min,
    Max,
    #[default]
    Avg,
    /// Min/max band plus the average line.
    All,
}

impl CalcFn {
    /// Short name used in the legend.
    pub fn label(self) -> &'static str {
        match self {
            CalcFn::Min => "min",
            CalcFn::Max => "max",
            CalcFn::Avg => "avg",
            CalcFn::All => "all",
        }
    }
}

/// How a series is drawn between two pixel columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawKind {
    #[default]
    Line,
    BoldLine,
    FilledRegion,
    Dot,
    BoldDot,
    DashedLine,
    GradientLine,
}

impl DrawKind {
    /// Region kinds keep out-of-band segments (clamped to the band edge) instead of dropping them.
    pub fn is_region(self) -> bool {
        match self {
            DrawKind::FilledRegion | DrawKind::GradientLine => true,
            DrawKind::Line
            | DrawKind::BoldLine
            | DrawKind::Dot
            | DrawKind::BoldDot
            | DrawKind::DashedLine => false,
        }
    }
}

/// Normal graphs draw series independently; stacked graphs pile same-side series on top of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
    #[default]
    Normal,
    Stacked,
}

/// One plotted series, as configured by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub item: ItemRef,
    /// Display name used in the legend.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub axis: AxisSide,
    #[serde(default)]
    pub calc_fn: CalcFn,
    #[serde(default)]
    pub draw_kind: DrawKind,
    pub color: Rgba,
    /// Units, optionally followed by a long form after a comma: `"B,Bytes received"`.
    #[serde(default)]
    pub units: String,
    /// Collection interval in seconds, if known. Enables gap skipping while drawing.
    #[serde(default)]
    pub delay: Option<i64>,
}

impl SeriesSpec {
    pub fn new(item: impl Into<String>, color: Rgba) -> Self {
        let item = ItemRef::new(item);
        Self {
            name: item.0.clone(),
            item,
            axis: AxisSide::Left,
            calc_fn: CalcFn::Avg,
            draw_kind: DrawKind::Line,
            color,
            units: String::new(),
            delay: None,
        }
    }

    pub fn with_axis(mut self, axis: AxisSide) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_calc_fn(mut self, calc_fn: CalcFn) -> Self {
        self.calc_fn = calc_fn;
        self
    }

    pub fn with_draw_kind(mut self, draw_kind: DrawKind) -> Self {
        self.draw_kind = draw_kind;
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Short units, e.g. `"B"` for `"B,Bytes received"`.
    pub fn short_units(&self) -> &str {
        match self.units.split_once(',') {
            Some((short, _)) => short,
            None => &self.units,
        }
    }

    /// Long units label drawn beside the axis, if any.
    pub fn long_units(&self) -> Option<&str> {
        self.units
            .split_once(',')
            .map(|(_, long)| long.trim())
            .filter(|long| !long.is_empty())
    }

    /// Byte-like units switch the axis to base-1024 steps.
    pub fn is_byte_units(&self) -> bool {
        matches!(self.short_units(), "B" | "Bps")
    }
}

/// Aggregate of all samples that fall into one pixel column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnAggregate {
    pub column: usize,
    pub count: u64,
    pub min: Decimal,
    pub max: Decimal,
    pub avg: Decimal,
    /// Representative time of the column (unix seconds).
    pub clock: Decimal,
}

/// Time span covered by the plot and its width in pixel columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: i64,
    pub period: i64,
    pub pixel_width: usize,
    /// UTC offset at `from` minus UTC offset at `to`, in seconds (non-zero across a DST change).
    pub tz_offset_diff: i64,
}

impl TimeWindow {
    pub fn to(&self) -> i64 {
        self.from + self.period
    }

    /// Seconds covered by one pixel column.
    pub fn column_seconds(&self) -> Decimal {
        Decimal::from(self.period) / Decimal::from(self.pixel_width.max(1))
    }
}
