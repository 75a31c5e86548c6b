//! Device-level drawing primitives and the [`Canvas`] they are replayed onto.

use serde::{Deserialize, Serialize};

use crate::theme::Rgba;

/// A point in device pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// On/off run lengths of a dashed stroke, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dash {
    pub on: u32,
    pub off: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Rgba,
    pub width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<Dash>,
}

impl Stroke {
    pub const fn solid(color: Rgba, width: u32) -> Self {
        Self { color, width, dash: None }
    }

    pub const fn dashed(color: Rgba, width: u32, on: u32, off: u32) -> Self {
        Self { color, width, dash: Some(Dash { on, off }) }
    }
}

/// Which point of the text box `at` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Left end of the baseline.
    #[default]
    BaselineLeft,
    /// Center of the baseline.
    BaselineCenter,
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<Point>,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
    Text {
        at: Point,
        text: String,
        font_px: u32,
        color: Rgba,
        #[serde(default)]
        anchor: Anchor,
        /// Counter-clockwise; `90` reads bottom to top.
        #[serde(default)]
        rotation_deg: u16,
    },
    /// Inclusive corners.
    Rect {
        top_left: Point,
        bottom_right: Point,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
    Ellipse {
        center: Point,
        width: u32,
        height: u32,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
}

impl Primitive {
    pub fn line(from: impl Into<Point>, to: impl Into<Point>, stroke: Stroke) -> Self {
        Primitive::Line { from: from.into(), to: to.into(), stroke }
    }

    pub fn filled_rect(top_left: impl Into<Point>, bottom_right: impl Into<Point>, fill: Rgba) -> Self {
        Primitive::Rect {
            top_left: top_left.into(),
            bottom_right: bottom_right.into(),
            fill: Some(fill),
            stroke: None,
        }
    }

    pub fn filled_polygon(points: Vec<Point>, fill: Rgba) -> Self {
        Primitive::Polygon { points, fill: Some(fill), stroke: None }
    }

    pub fn text(at: impl Into<Point>, text: impl Into<String>, font_px: u32, color: Rgba) -> Self {
        Primitive::Text {
            at: at.into(),
            text: text.into(),
            font_px,
            color,
            anchor: Anchor::BaselineLeft,
            rotation_deg: 0,
        }
    }

    /// Text rotated to read bottom to top.
    pub fn vertical_text(at: impl Into<Point>, text: impl Into<String>, font_px: u32, color: Rgba) -> Self {
        Primitive::Text {
            at: at.into(),
            text: text.into(),
            font_px,
            color,
            anchor: Anchor::BaselineLeft,
            rotation_deg: 90,
        }
    }
}

/// Drawing surface. Coordinates are device pixels; colors carry their own opacity.
pub trait Canvas {
    fn draw(&mut self, primitive: &Primitive);
}

/// Recording canvas.
impl Canvas for Vec<Primitive> {
    fn draw(&mut self, primitive: &Primitive) {
        self.push(primitive.clone());
    }
}
