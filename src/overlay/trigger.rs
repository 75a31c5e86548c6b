//! Trigger threshold lines.
//!
//! Selection happens before layout (the legend needs the row count), placement after the
//! axes are known.

use std::str::FromStr;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::axis::AxisSet;
use crate::config::GraphConfig;
use crate::error::GraphResult;
use crate::models::AxisSide;
use crate::source::ThresholdSource;
use crate::theme::{GraphTheme, Rgba};

/// At most this many trigger lines per graph, first found in series order.
pub const TRIGGER_LIMIT: usize = 3;

static SIMPLE_THRESHOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{([0-9]+)\}\s*?(<=|>=|[<>=])\s*?([\-0-9.]+)([KMGTsmhdw]?)$")
        .expect("valid threshold pattern")
});

/// A parsed single-function comparison, e.g. `{42}>=1.5K`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdExpr {
    pub operator: String,
    /// Constant exactly as written, suffix included.
    pub constant: String,
    /// Constant with its suffix applied.
    pub value: Decimal,
}

/// Parse a threshold expression; anything but `{N} OP const[suffix]` yields `None`.
pub fn parse_threshold(expression: &str) -> Option<ThresholdExpr> {
    let caps = SIMPLE_THRESHOLD.captures(expression.trim())?;
    let number = Decimal::from_str(&caps[3]).ok()?;
    let suffix = &caps[4];
    let multiplier: u64 = match suffix {
        "" | "s" => 1,
        "K" => 1024,
        "M" => 1024 * 1024,
        "G" => 1024 * 1024 * 1024,
        "T" => 1024 * 1024 * 1024 * 1024,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        "w" => 7 * 86400,
        _ => return None,
    };
    Some(ThresholdExpr {
        operator: caps[2].to_string(),
        constant: format!("{}{}", &caps[3], suffix),
        value: number * Decimal::from(multiplier),
    })
}

/// A selected threshold, not yet placed on an axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerCandidate {
    pub side: AxisSide,
    pub value: Decimal,
    pub severity: u8,
    /// `Trigger: <name>`.
    pub description: String,
    /// `[OP const]`.
    pub constant: String,
}

/// A threshold placed on its axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerOverlay {
    pub side: AxisSide,
    pub value: Decimal,
    pub y_px: i32,
    pub color: Rgba,
    pub description: String,
    pub constant: String,
    /// The value lies on or outside the axis range; the line is not drawn, the legend row is.
    pub skipdraw: bool,
}

pub struct TriggerOverlayCalculator<'a> {
    config: &'a GraphConfig,
}

impl<'a> TriggerOverlayCalculator<'a> {
    pub fn new(config: &'a GraphConfig) -> Self {
        Self { config }
    }

    /// First [`TRIGGER_LIMIT`] parseable thresholds, series in caller order and each
    /// series' thresholds by ascending severity.
    pub fn select(&self, thresholds: &dyn ThresholdSource) -> GraphResult<Vec<TriggerCandidate>> {
        let mut out = Vec::new();
        if !self.config.show_triggers {
            return Ok(out);
        }

        for spec in &self.config.series {
            if out.len() >= TRIGGER_LIMIT {
                break;
            }
            let mut found = thresholds.matching_thresholds(&spec.item)?;
            found.sort_by_key(|t| t.priority);
            for t in found {
                if out.len() >= TRIGGER_LIMIT {
                    break;
                }
                let Some(expr) = parse_threshold(&t.expression) else {
                    debug!("skipping threshold {:?} of {}", t.expression, spec.item);
                    continue;
                };
                out.push(TriggerCandidate {
                    side: spec.axis,
                    value: expr.value,
                    severity: t.priority,
                    description: format!("Trigger: {}", t.description),
                    constant: format!("[{} {}]", expr.operator, expr.constant),
                });
            }
        }
        Ok(out)
    }

    /// Map every candidate onto its side's axis.
    pub fn place(
        candidates: &[TriggerCandidate],
        axes: &AxisSet,
        theme: &GraphTheme,
    ) -> Vec<TriggerOverlay> {
        candidates
            .iter()
            .map(|c| {
                let axis = axes.get(c.side).or_else(|| axes.primary());
                let (y_px, skipdraw) = match axis {
                    Some(a) => (a.value_to_y(c.value), c.value <= a.min || c.value >= a.max),
                    None => (0, true),
                };
                TriggerOverlay {
                    side: c.side,
                    value: c.value,
                    y_px,
                    color: theme.severity_color(c.severity),
                    description: c.description.clone(),
                    constant: c.constant.clone(),
                    skipdraw,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_pattern_compiles() {
        assert!(SIMPLE_THRESHOLD.is_match("{1}>=2K"));
        assert!(!SIMPLE_THRESHOLD.is_match("{1}>{2}"));
    }

    #[test]
    fn parses_suffixes() {
        let e = parse_threshold("{123}>=1.5K").unwrap();
        assert_eq!(e.operator, ">=");
        assert_eq!(e.constant, "1.5K");
        assert_eq!(e.value, Decimal::from(1536));
        assert_eq!(parse_threshold("{1}<5m").unwrap().value, Decimal::from(300));
        assert_eq!(parse_threshold("{1} = -2").unwrap().value, Decimal::from(-2));
    }

    #[test]
    fn rejects_compound_expressions() {
        assert!(parse_threshold("{1}>5 and {2}<3").is_none());
        assert!(parse_threshold("{1}>abc").is_none());
        assert!(parse_threshold("{1}>5X").is_none());
    }
}
