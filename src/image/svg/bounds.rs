//! Axis-aligned bounds of shape geometry.
//!
//! Bounds come from the geometry attributes only: `x`/`y`/`width`/`height`
//! for rectangles, `points` for polygons and every point of a path's
//! segments (end points and control points, arcs as their curve
//! approximation). Transforms are not applied.

use svgtypes::{Length, LengthUnit, PointsParser, SimplePathSegment, SimplifyingPathParser};

use super::document::{ShapeKind, ShapeNode};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn point(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Merge a point into optional bounds
fn merge_point(bounds: Option<Bounds>, (x, y): (f64, f64)) -> Option<Bounds> {
    match bounds {
        Some(b) => Some(Bounds {
            min_x: b.min_x.min(x),
            min_y: b.min_y.min(y),
            max_x: b.max_x.max(x),
            max_y: b.max_y.max(y),
        }),
        None => Some(Bounds::point(x, y)),
    }
}

/// Bounds of a shape. Percent lengths resolve against `canvas`.
pub fn shape_bounds(shape: &ShapeNode<'_>, canvas: (f64, f64)) -> Option<Bounds> {
    geometry_bounds(shape.kind, |name| shape.attr(name), canvas)
}

/// Bounds of a `kind` element whose attributes are read through `attr`.
pub fn geometry_bounds(
    kind: ShapeKind,
    attr: impl Fn(&str) -> Option<String>,
    canvas: (f64, f64),
) -> Option<Bounds> {
    match kind {
        ShapeKind::Rect => rect_bounds(&attr, canvas),
        ShapeKind::Polygon => points_bounds(&attr("points")?),
        ShapeKind::Path => path_bounds(&attr("d")?),
    }
}

fn rect_bounds(attr: &impl Fn(&str) -> Option<String>, (cw, ch): (f64, f64)) -> Option<Bounds> {
    let length = |name: &str, reference: f64, default: Option<f64>| match attr(name) {
        Some(v) => user_length(&v, reference),
        None => default,
    };
    let x = length("x", cw, Some(0.0))?;
    let y = length("y", ch, Some(0.0))?;
    let w = length("width", cw, None)?;
    let h = length("height", ch, None)?;
    if w < 0.0 || h < 0.0 {
        return None;
    }
    Some(Bounds {
        min_x: x,
        min_y: y,
        max_x: x + w,
        max_y: y + h,
    })
}

/// A length in user units; `%` is relative to `reference`. Font-relative
/// units have no size here.
pub fn user_length(value: &str, reference: f64) -> Option<f64> {
    let length: Length = value.trim().parse().ok()?;
    let factor = match length.unit {
        LengthUnit::None | LengthUnit::Px => 1.0,
        LengthUnit::Percent => reference / 100.0,
        LengthUnit::Pt => 4.0 / 3.0,
        LengthUnit::Pc => 16.0,
        LengthUnit::In => 96.0,
        LengthUnit::Cm => 96.0 / 2.54,
        LengthUnit::Mm => 96.0 / 25.4,
        LengthUnit::Em | LengthUnit::Ex => return None,
    };
    Some(length.number * factor)
}

fn points_bounds(points: &str) -> Option<Bounds> {
    PointsParser::from(points).fold(None, merge_point)
}

/// Bounds of every point visited by path data.
///
/// Malformed data, or data not starting with a moveto, yields `None`.
pub fn path_bounds(d: &str) -> Option<Bounds> {
    let mut bounds = None;
    for segment in SimplifyingPathParser::from(d) {
        match segment.ok()? {
            SimplePathSegment::MoveTo { x, y } | SimplePathSegment::LineTo { x, y } => {
                bounds = merge_point(bounds, (x, y));
            }
            SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                for p in [(x1, y1), (x2, y2), (x, y)] {
                    bounds = merge_point(bounds, p);
                }
            }
            SimplePathSegment::Quadratic { x1, y1, x, y } => {
                bounds = merge_point(bounds, (x1, y1));
                bounds = merge_point(bounds, (x, y));
            }
            SimplePathSegment::ClosePath => {}
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::svg::document::VectorDocument;

    fn first_shape_bounds(svg: &str, canvas: (f64, f64)) -> Option<Bounds> {
        let doc = VectorDocument::parse(svg).unwrap();
        let shape = doc.shapes().next().unwrap();
        shape_bounds(&shape, canvas)
    }

    #[test]
    fn test_rect_bounds() {
        let b = first_shape_bounds(r#"<svg><rect x="5" y="6" width="10" height="20"/></svg>"#, (100.0, 100.0)).unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (5.0, 6.0, 15.0, 26.0));
    }

    #[test]
    fn test_rect_percent_and_defaults() {
        let b = first_shape_bounds(r#"<svg><rect width="100%" height="50%"/></svg>"#, (200.0, 80.0)).unwrap();
        assert_eq!((b.min_x, b.min_y, b.width(), b.height()), (0.0, 0.0, 200.0, 40.0));
    }

    #[test]
    fn test_rect_without_size() {
        assert!(first_shape_bounds(r#"<svg><rect x="1"/></svg>"#, (10.0, 10.0)).is_none());
        assert!(first_shape_bounds(r#"<svg><rect width="2em" height="1"/></svg>"#, (10.0, 10.0)).is_none());
    }

    #[test]
    fn test_user_length_units() {
        assert_eq!(user_length(" 12px ", 0.0), Some(12.0));
        assert_eq!(user_length("1in", 0.0), Some(96.0));
        assert_eq!(user_length("25%", 40.0), Some(10.0));
        assert_eq!(user_length("wide", 40.0), None);
    }

    #[test]
    fn test_polygon_points() {
        let b = first_shape_bounds(r#"<svg><polygon points="0,0 100,0 100,50 -2,50"/></svg>"#, (1.0, 1.0)).unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (-2.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_path_absolute_and_relative() {
        let b = path_bounds("M0 0 H595 V842 H0 Z").unwrap();
        assert_eq!((b.width(), b.height()), (595.0, 842.0));

        let b = path_bounds("m10,10 l5-5 5,5 z").unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (10.0, 5.0, 20.0, 10.0));
    }

    #[test]
    fn test_path_compact_numbers() {
        // "0.5.5" is two numbers, "-1-1" is two numbers.
        let b = path_bounds("M0.5.5L-1-1").unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (-1.0, -1.0, 0.5, 0.5));
        let b = path_bounds("M1e2 0L0 2E1").unwrap();
        assert_eq!((b.max_x, b.max_y), (100.0, 20.0));
    }

    #[test]
    fn test_path_curves() {
        let b = path_bounds("M0 0 C 10 -10 20 30 40 0 Q 50 50 60 0").unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (0.0, -10.0, 60.0, 50.0));
    }

    #[test]
    fn test_path_arc_reaches_its_bulge() {
        let b = path_bounds("M0 0 A10 10 0 0 1 20 0").unwrap();
        assert!(b.min_x.abs() < 1e-6);
        assert!((b.max_x - 20.0).abs() < 1e-6);
        assert!(b.min_y < -9.0);
    }

    #[test]
    fn test_malformed_path() {
        assert!(path_bounds("L 10 10").is_none());
        assert!(path_bounds("M 10").is_none());
        assert!(path_bounds("M 0 0 X 1 1").is_none());
    }
}
