//! Page-rendering engine.
//!
//! The rest of the tool only sees [`PageEngine`]: page count, page bounds,
//! clipped rasterization and clipped vector extraction. [`SvgEngine`] is
//! the concrete engine: one SVG file is a one-page document, a directory of
//! SVG files is a multi-page document ordered by file name.

mod svg;

pub use svg::SvgEngine;

use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::geometry::{Document, Rect};
use crate::image::svg::{RasterizeError, SvgError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("`{0}` is not a supported document (expected an .svg file or a directory of them)")]
    Unsupported(PathBuf),

    #[error("no pages found in `{0}`")]
    Empty(PathBuf),

    #[error("failed to parse page `{path}`")]
    Parse {
        path: PathBuf,
        #[source]
        source: usvg::Error,
    },

    #[error("page {page} is out of range (document has {count})")]
    PageOutOfRange { page: usize, count: usize },

    #[error("clip region {0} is empty")]
    EmptyClip(Rect<Document>),

    #[error(transparent)]
    Render(#[from] RasterizeError),

    #[error(transparent)]
    Vector(#[from] SvgError),
}

/// Pixels per document unit, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub const fn uniform(zoom: f64) -> Self {
        Self { x: zoom, y: zoom }
    }
}

/// An open document.
///
/// Page indices are zero-based. Clip rectangles are in document units and
/// are clamped to the page before use.
pub trait PageEngine {
    fn path(&self) -> &Path;

    fn page_count(&self) -> usize;

    /// Page bounds in document units, origin at `(0, 0)`.
    fn page_bounds(&self, page: usize) -> Result<Rect<Document>, EngineError>;

    /// Rasterize `clip` (or the whole page) at `scale`.
    fn rasterize(
        &self,
        page: usize,
        scale: Scale,
        clip: Option<Rect<Document>>,
    ) -> Result<RgbaImage, EngineError>;

    /// Vector text of `clip`, sized to the clip region.
    fn extract_vector(&self, page: usize, clip: Rect<Document>) -> Result<String, EngineError>;
}

/// Open a document from `path`.
pub fn open(path: &Path) -> Result<Box<dyn PageEngine>, EngineError> {
    Ok(Box::new(SvgEngine::open(path)?))
}
