use super::{Canvas, Device, Document, Point, Rect};

/// Converts between canvas, device and document coordinates.
///
/// ```text
/// canvas ──÷ display_scale──► device ──÷ zoom──► document
/// canvas ◄──× display_scale── device ◄──× zoom── document
/// ```
///
/// Document results are clamped to the page bounds; out-of-range input is
/// never an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    /// Canvas pixels per device pixel.
    display_scale: f64,
    /// Device pixels per document unit.
    zoom: f64,
    page: Rect<Document>,
}

impl CoordinateMapper {
    /// Mapper with explicit factors. Non-positive factors fall back to 1.
    pub fn new(page: Rect<Document>, zoom: f64, display_scale: f64) -> Self {
        Self {
            display_scale: positive_or_one(display_scale),
            zoom: positive_or_one(zoom),
            page: page.normalized(),
        }
    }

    /// Mapper for a page rendered at `zoom` and fitted (aspect preserved)
    /// into a `viewport` of canvas pixels.
    pub fn fit(page: Rect<Document>, zoom: f64, viewport: (u32, u32)) -> Self {
        let zoom = positive_or_one(zoom);
        let device_w = page.width() * zoom;
        let device_h = page.height() * zoom;
        let scale = if device_w > 0.0 && device_h > 0.0 {
            (f64::from(viewport.0) / device_w).min(f64::from(viewport.1) / device_h)
        } else {
            1.0
        };
        Self::new(page, zoom, scale)
    }

    pub fn display_scale(&self) -> f64 {
        self.display_scale
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn page(&self) -> Rect<Document> {
        self.page
    }

    /// Size of the page rendered at the current zoom, in device pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn device_size(&self) -> (u32, u32) {
        (
            (self.page.width() * self.zoom).round() as u32,
            (self.page.height() * self.zoom).round() as u32,
        )
    }

    /// Size of the displayed page on the canvas, in canvas pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn canvas_size(&self) -> (u32, u32) {
        let (w, h) = self.device_size();
        (
            (f64::from(w) * self.display_scale) as u32,
            (f64::from(h) * self.display_scale) as u32,
        )
    }

    pub fn canvas_to_device(&self, p: Point<Canvas>) -> Point<Device> {
        Point::new(p.x / self.display_scale, p.y / self.display_scale)
    }

    pub fn device_to_document(&self, p: Point<Device>) -> Point<Document> {
        Point::new(p.x / self.zoom, p.y / self.zoom)
    }

    pub fn device_to_canvas(&self, p: Point<Device>) -> Point<Canvas> {
        Point::new(p.x * self.display_scale, p.y * self.display_scale)
    }

    pub fn document_to_device(&self, p: Point<Document>) -> Point<Device> {
        Point::new(p.x * self.zoom, p.y * self.zoom)
    }

    /// Canvas point to document point, clamped to the page.
    pub fn to_document(&self, p: Point<Canvas>) -> Point<Document> {
        let doc = self.device_to_document(self.canvas_to_device(p));
        self.page.clamp_point(doc)
    }

    /// Document point to canvas point.
    pub fn to_canvas(&self, p: Point<Document>) -> Point<Canvas> {
        self.device_to_canvas(self.document_to_device(p))
    }

    /// Canvas rectangle to a normalized document rectangle inside the page.
    pub fn rect_to_document(&self, r: Rect<Canvas>) -> Rect<Document> {
        let r = r.normalized();
        Rect::from_corners(
            self.to_document(Point::new(r.x0, r.y0)),
            self.to_document(Point::new(r.x1, r.y1)),
        )
    }

    /// Document rectangle to a normalized canvas rectangle.
    pub fn rect_to_canvas(&self, r: Rect<Document>) -> Rect<Canvas> {
        let r = r.normalized();
        Rect::from_corners(
            self.to_canvas(Point::new(r.x0, r.y0)),
            self.to_canvas(Point::new(r.x1, r.y1)),
        )
    }
}

#[inline]
fn positive_or_one(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 1.0 }
}
