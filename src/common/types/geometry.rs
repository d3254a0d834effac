//! Geometric types for crosshair placement
//!
//! Provides type-safe wrappers for points, lines and rectangles, and the
//! calculation that places the two crosshair lines inside a viewport.
//! Nothing here knows about X11; the overlay converts `Rect` into protocol
//! rectangles itself.

use serde::{Deserialize, Serialize};

/// A point in viewport pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from(tuple: (i32, i32)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

/// Viewport dimensions (width × height)
/// Using a newtype prevents accidentally swapping width and height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
}

impl Dimensions {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u16, u16)> for Dimensions {
    fn from(tuple: (u16, u16)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A straight line segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: impl Into<Point>, end: impl Into<Point>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Span of the line along its major axis (0 for degenerate lines)
    pub fn length(&self) -> u32 {
        let dx = self.start.x.abs_diff(self.end.x);
        let dy = self.start.y.abs_diff(self.end.y);
        dx.max(dy)
    }

    /// Rectangle covered by this line when stroked with `thickness` pixels.
    ///
    /// Only axis-aligned lines are supported. The stroke is centered on the
    /// line; for even thicknesses the extra pixel goes before the line.
    /// Crossed endpoints are normalized, so the rectangle always has a
    /// non-negative extent.
    pub fn to_rect(&self, thickness: u32) -> Rect {
        let thickness = thickness.max(1);
        let half = (thickness / 2) as i32;

        let (x0, x1) = ordered(self.start.x, self.end.x);
        let (y0, y1) = ordered(self.start.y, self.end.y);

        if x0 == x1 {
            Rect {
                x: x0 - half,
                y: y0,
                width: thickness,
                height: (y1 - y0) as u32,
            }
        } else {
            Rect {
                x: x0,
                y: y0 - half,
                width: (x1 - x0) as u32,
                height: thickness,
            }
        }
    }
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b { (a, b) } else { (b, a) }
}

fn scale(dimension: u16, ratio: f64) -> i32 {
    (dimension as f64 * ratio).round() as i32
}

/// Place the crosshair lines inside a `width` × `height` viewport.
///
/// The vertical line runs down the horizontal center (`width / 2`) from
/// `height * v_ratio` to `height * (1 - v_ratio)`; the horizontal line runs
/// across the vertical center from `width * h_ratio` to
/// `width * (1 - h_ratio)`. Ratios are expected in 0.0..=0.5; values outside
/// produce degenerate or crossed lines.
pub fn compute(width: u16, height: u16, v_ratio: f64, h_ratio: f64) -> (Line, Line) {
    let cx = (width / 2) as i32;
    let cy = (height / 2) as i32;

    let vertical = Line::new(
        (cx, scale(height, v_ratio)),
        (cx, scale(height, 1.0 - v_ratio)),
    );
    let horizontal = Line::new(
        (scale(width, h_ratio), cy),
        (scale(width, 1.0 - h_ratio), cy),
    );

    (vertical, horizontal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_with_vertical_offset() {
        let (vertical, horizontal) = compute(800, 600, 0.1, 0.0);

        assert_eq!(vertical, Line::new((400, 60), (400, 540)));
        assert_eq!(horizontal, Line::new((0, 300), (800, 300)));
    }

    #[test]
    fn test_compute_full_span() {
        let (vertical, horizontal) = compute(1920, 1080, 0.0, 0.0);

        assert_eq!(vertical, Line::new((960, 0), (960, 1080)));
        assert_eq!(horizontal, Line::new((0, 540), (1920, 540)));
        assert_eq!(vertical.length(), 1080);
        assert_eq!(horizontal.length(), 1920);
    }

    #[test]
    fn test_compute_max_offset_collapses_to_center() {
        let (vertical, horizontal) = compute(1000, 500, 0.5, 0.5);

        assert_eq!(vertical, Line::new((500, 250), (500, 250)));
        assert_eq!(horizontal, Line::new((500, 250), (500, 250)));
        assert_eq!(vertical.length(), 0);
    }

    #[test]
    fn test_compute_odd_dimensions_use_integer_center() {
        let (vertical, horizontal) = compute(801, 601, 0.0, 0.25);

        assert_eq!(vertical.start.x, 400);
        assert_eq!(horizontal.start.y, 300);
        // 801 * 0.25 = 200.25, 801 * 0.75 = 600.75
        assert_eq!(horizontal.start.x, 200);
        assert_eq!(horizontal.end.x, 601);
    }

    #[test]
    fn test_compute_is_deterministic() {
        assert_eq!(compute(640, 480, 0.2, 0.3), compute(640, 480, 0.2, 0.3));
    }

    #[test]
    fn test_compute_out_of_range_ratio_crosses_lines() {
        let (vertical, _) = compute(800, 600, 0.75, 0.0);

        assert_eq!(vertical.start.y, 450);
        assert_eq!(vertical.end.y, 150);
    }

    #[test]
    fn test_vertical_line_to_rect_centers_stroke() {
        let line = Line::new((400, 60), (400, 540));

        assert_eq!(
            line.to_rect(1),
            Rect {
                x: 400,
                y: 60,
                width: 1,
                height: 480
            }
        );
        assert_eq!(
            line.to_rect(3),
            Rect {
                x: 399,
                y: 60,
                width: 3,
                height: 480
            }
        );
        assert_eq!(line.to_rect(4).x, 398);
    }

    #[test]
    fn test_horizontal_line_to_rect_centers_stroke() {
        let line = Line::new((0, 300), (800, 300));

        assert_eq!(
            line.to_rect(5),
            Rect {
                x: 0,
                y: 298,
                width: 800,
                height: 5
            }
        );
    }

    #[test]
    fn test_to_rect_normalizes_crossed_lines() {
        let line = Line::new((400, 450), (400, 150));
        let rect = line.to_rect(1);

        assert_eq!(rect.y, 150);
        assert_eq!(rect.height, 300);
    }

    #[test]
    fn test_to_rect_zero_thickness_draws_one_pixel() {
        let line = Line::new((10, 0), (10, 20));
        assert_eq!(line.to_rect(0).width, 1);
    }

    #[test]
    fn test_dimensions_is_empty() {
        assert!(Dimensions::new(0, 100).is_empty());
        assert!(!Dimensions::from((1920, 1080)).is_empty());
    }
}
