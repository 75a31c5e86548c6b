//! Render configuration: what to draw, how large, over which time window.
//!
//! Everything is `serde`-deserialisable so a graph can be described in a JSON scene file.
//! Every field except `series` has a default.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AxisSide, GraphType, ItemRef, SeriesSpec};
use crate::theme::GraphTheme;

/// How one bound (min or max) of a Y axis is obtained.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Bound {
    /// Derived from the series data.
    #[default]
    Calculated,
    /// A configured constant.
    Fixed(Decimal),
    /// The latest sample of a reference item.
    ItemValue(ItemRef),
}

impl Bound {
    pub fn is_calculated(&self) -> bool {
        matches!(self, Bound::Calculated)
    }

    pub fn fixed_value(&self) -> Option<Decimal> {
        match self {
            Bound::Fixed(v) => Some(*v),
            Bound::Calculated | Bound::ItemValue(_) => None,
        }
    }
}

/// Y axis mode of one side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisBounds {
    pub min: Bound,
    pub max: Bound,
}

impl AxisBounds {
    pub fn calculated() -> Self {
        Self::default()
    }

    /// Fixed bounds; a `None` side stays calculated.
    pub fn fixed(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self {
            min: min.map_or(Bound::Calculated, Bound::Fixed),
            max: max.map_or(Bound::Calculated, Bound::Fixed),
        }
    }

    /// Bounds taken from the latest values of reference items.
    pub fn item_value(min: Option<ItemRef>, max: Option<ItemRef>) -> Self {
        Self {
            min: min.map_or(Bound::Calculated, Bound::ItemValue),
            max: max.map_or(Bound::Calculated, Bound::ItemValue),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YAxisConfig {
    pub left: AxisBounds,
    pub right: AxisBounds,
}

impl YAxisConfig {
    pub fn side(&self, side: AxisSide) -> &AxisBounds {
        match side {
            AxisSide::Left => &self.left,
            AxisSide::Right => &self.right,
        }
    }
}

/// Percentile lines per side; `0` disables the line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentileConfig {
    pub left: Decimal,
    pub right: Decimal,
}

impl PercentileConfig {
    pub fn side(&self, side: AxisSide) -> Decimal {
        match side {
            AxisSide::Left => self.left,
            AxisSide::Right => self.right,
        }
    }
}

/// Full description of one graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub graph_type: GraphType,
    /// Outer image width in pixels; the plot area is what remains after axes and legend.
    pub width: u32,
    /// Outer image height in pixels.
    pub height: u32,
    /// Window start (unix seconds). `None` means "now minus period".
    pub from: Option<i64>,
    /// Window length in seconds.
    pub period: i64,
    /// UTC offset (seconds east) used for calendar-aware ticks and work periods.
    pub utc_offset_secs: i32,
    pub title: Option<String>,
    pub series: Vec<SeriesSpec>,
    pub y_axis: YAxisConfig,
    pub percentile: PercentileConfig,
    pub show_triggers: bool,
    pub show_work_period: bool,
    pub show_legend: bool,
    /// Working time, e.g. `1-5,09:00-18:00;6-6,10:00-14:00` (days 1=Mon..7=Sun).
    pub work_period: String,
    pub theme: GraphTheme,
    pub watermark: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            graph_type: GraphType::Normal,
            width: 900,
            height: 300,
            from: None,
            period: 3600,
            utc_offset_secs: 0,
            title: None,
            series: Vec::new(),
            y_axis: YAxisConfig::default(),
            percentile: PercentileConfig::default(),
            show_triggers: true,
            show_work_period: true,
            show_legend: true,
            work_period: "1-5,09:00-18:00".to_string(),
            theme: GraphTheme::default(),
            watermark: None,
        }
    }
}

impl GraphConfig {
    /// Sides that have at least one series. An empty graph still gets a left axis.
    pub fn sides(&self) -> Vec<AxisSide> {
        let sides: Vec<AxisSide> = AxisSide::BOTH
            .into_iter()
            .filter(|side| self.series.iter().any(|s| s.axis == *side))
            .collect();
        if sides.is_empty() {
            vec![AxisSide::Left]
        } else {
            sides
        }
    }

    pub fn has_side(&self, side: AxisSide) -> bool {
        self.series.iter().any(|s| s.axis == side)
    }

    /// Parse a JSON graph description.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_uses_defaults() {
        let cfg = GraphConfig::from_json(
            r#"{ "period": 86400, "series": [ { "item": "cpu", "color": "00AA00" } ] }"#,
        )
        .unwrap();
        assert_eq!(cfg.period, 86400);
        assert_eq!(cfg.width, 900);
        assert!(cfg.show_legend);
        assert_eq!(cfg.series[0].axis, AxisSide::Left);
        assert_eq!(cfg.sides(), vec![AxisSide::Left]);
    }

    #[test]
    fn bounds_deserialize_tagged() {
        let cfg = GraphConfig::from_json(
            r#"{ "y_axis": { "right": { "min": { "mode": "fixed", "value": "-5" },
                                        "max": { "mode": "item_value", "value": "limit" } } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.y_axis.right.min, Bound::Fixed(Decimal::from(-5)));
        assert_eq!(cfg.y_axis.right.max, Bound::ItemValue(ItemRef::new("limit")));
        assert!(cfg.y_axis.left.min.is_calculated());
    }
}
