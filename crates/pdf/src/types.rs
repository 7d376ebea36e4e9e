use pdflayers_core::layers::{Point, StrokeStyle};

/// One segment of a painted path, in top-left-origin page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathItem {
    Line(Point, Point),
    Curve(Point, Point, Point, Point),
    Rect(Point, Point),
}

/// A painted path as produced by the drawing interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub items: Vec<PathItem>,
    /// Stroke width after the CTM is applied.
    pub width: f64,
    /// Stroke alpha for stroked paths, fill alpha otherwise.
    pub opacity: f64,
    /// Stroke color as RGB. `None` when the path is not stroked.
    pub color: Option<[f64; 3]>,
    pub close_path: bool,
    pub stroked: bool,
    pub filled: bool,
}

impl Drawing {
    /// The line segments of this drawing, in paint order.
    pub fn lines(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.items.iter().filter_map(|item| match item {
            PathItem::Line(p1, p2) => Some((*p1, *p2)),
            _ => None,
        })
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            width: self.width,
            opacity: self.opacity,
            color: self.color,
            close_path: self.close_path,
        }
    }
}
