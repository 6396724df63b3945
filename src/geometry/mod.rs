//! Space-tagged points and rectangles.
//!
//! Three coordinate spaces are in play:
//!
//! | Space      | Unit                                             |
//! |------------|--------------------------------------------------|
//! | `Canvas`   | on-screen pixels where the user drags            |
//! | `Device`   | pixels of the page rendered at the current zoom  |
//! | `Document` | page units (72 per inch), independent of zoom    |
//!
//! The space is a type parameter, so handing a canvas rectangle to
//! something that expects document units does not compile. Conversion
//! goes through [`CoordinateMapper`].

mod mapper;

pub use mapper::CoordinateMapper;

use std::fmt;
use std::marker::PhantomData;

/// Marker trait for a coordinate space.
pub trait Space: Copy + fmt::Debug + PartialEq + Default {
    const NAME: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Device;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Document;

impl Space for Canvas {
    const NAME: &'static str = "canvas";
}

impl Space for Device {
    const NAME: &'static str = "device";
}

impl Space for Document {
    const NAME: &'static str = "document";
}

/// A point in space `S`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point<S: Space> {
    pub x: f64,
    pub y: f64,
    space: PhantomData<S>,
}

impl<S: Space> Point<S> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }
}

/// An axis-aligned rectangle `(x0, y0, x1, y1)` in space `S`.
///
/// Corners are stored as given; [`Rect::normalized`] orders them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect<S: Space> {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    space: PhantomData<S>,
}

impl<S: Space> Rect<S> {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            space: PhantomData,
        }
    }

    /// Rectangle from origin and size.
    pub const fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Rectangle spanned by two corner points, in any order.
    pub fn from_corners(a: Point<S>, b: Point<S>) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    /// Same rectangle with `x0 <= x1` and `y0 <= y1`.
    pub fn normalized(self) -> Self {
        Self::new(
            self.x0.min(self.x1),
            self.y0.min(self.y1),
            self.x0.max(self.x1),
            self.y0.max(self.y1),
        )
    }

    pub fn width(&self) -> f64 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y1 - self.y0).abs()
    }

    pub fn origin(&self) -> Point<S> {
        Point::new(self.x0, self.y0)
    }

    /// True when the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= f64::EPSILON || self.height() <= f64::EPSILON
    }

    /// Intersect with `bounds`. Narrows only; never grows the rectangle.
    ///
    /// A rectangle fully outside `bounds` collapses onto its nearest edge.
    pub fn clamp_to(self, bounds: &Rect<S>) -> Self {
        let r = self.normalized();
        let b = bounds.normalized();
        let x0 = r.x0.clamp(b.x0, b.x1);
        let y0 = r.y0.clamp(b.y0, b.y1);
        let x1 = r.x1.clamp(b.x0, b.x1);
        let y1 = r.y1.clamp(b.y0, b.y1);
        Self::new(x0, y0, x1.max(x0), y1.max(y0))
    }

    /// Clamp a point into this rectangle.
    pub fn clamp_point(&self, p: Point<S>) -> Point<S> {
        let b = self.normalized();
        Point::new(p.x.clamp(b.x0, b.x1), p.y.clamp(b.y0, b.y1))
    }
}

impl<S: Space> fmt::Display for Rect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:.2}, {:.2}, {:.2}, {:.2})",
            S::NAME,
            self.x0,
            self.y0,
            self.x1,
            self.y1
        )
    }
}
