//! Render strategies.
//!
//! The strategy is chosen once per run: the vector rasterizer when one is
//! available and vector text was extracted, otherwise the page engine.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use thiserror::Error;

use crate::engine::{EngineError, PageEngine, Scale};
use crate::geometry::{Document, Rect};
use crate::image::svg::{RasterizeError, VectorRasterizer};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Vector(#[from] RasterizeError),

    #[error(transparent)]
    Page(#[from] EngineError),
}

/// What an export run renders from.
pub struct ExportSource<'a> {
    pub engine: &'a dyn PageEngine,
    pub page: usize,
    pub region: Rect<Document>,
    /// Extracted (and possibly stripped) vector text of `region`.
    pub vector: Option<&'a str>,
}

pub enum RenderStrategy<'a> {
    /// Rasterize the vector text directly at the target size.
    Vector {
        rasterizer: &'a VectorRasterizer,
        svg: &'a str,
    },
    /// Re-render the page region through the engine.
    Page {
        engine: &'a dyn PageEngine,
        page: usize,
        region: Rect<Document>,
    },
}

impl<'a> RenderStrategy<'a> {
    pub fn select(source: &ExportSource<'a>, rasterizer: Option<&'a VectorRasterizer>) -> Self {
        match (rasterizer, source.vector) {
            (Some(rasterizer), Some(svg)) => Self::Vector { rasterizer, svg },
            _ => Self::Page {
                engine: source.engine,
                page: source.page,
                region: source.region,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Vector { rasterizer, .. } => rasterizer.name(),
            Self::Page { .. } => "page",
        }
    }

    /// Render exactly `width`x`height` pixels.
    pub fn render(&self, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
        let img = match self {
            Self::Vector { rasterizer, svg } => rasterizer.render(svg, width, height)?,
            Self::Page {
                engine,
                page,
                region,
            } => {
                let scale = Scale {
                    x: f64::from(width) / region.width(),
                    y: f64::from(height) / region.height(),
                };
                engine.rasterize(*page, scale, Some(*region))?
            }
        };

        if img.dimensions() == (width, height) {
            Ok(img)
        } else {
            Ok(imageops::resize(&img, width, height, FilterType::Lanczos3))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SvgEngine;
    use tempfile::TempDir;

    const PAGE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="20"><rect width="30" height="20" fill="green"/></svg>"#;

    fn open_page(dir: &TempDir) -> SvgEngine {
        let path = dir.path().join("page.svg");
        std::fs::write(&path, PAGE).unwrap();
        SvgEngine::open(&path).unwrap()
    }

    #[test]
    fn test_select_prefers_vector() {
        let dir = TempDir::new().unwrap();
        let engine = open_page(&dir);
        let rasterizer = VectorRasterizer::Builtin(Box::default());
        let source = ExportSource {
            engine: &engine,
            page: 0,
            region: Rect::from_xywh(0.0, 0.0, 30.0, 20.0),
            vector: Some(PAGE),
        };

        assert_eq!(RenderStrategy::select(&source, Some(&rasterizer)).name(), "builtin");
        assert_eq!(RenderStrategy::select(&source, None).name(), "page");

        let no_vector = ExportSource { vector: None, ..source };
        assert_eq!(RenderStrategy::select(&no_vector, Some(&rasterizer)).name(), "page");
    }

    #[test]
    fn test_page_fallback_hits_exact_size() {
        let dir = TempDir::new().unwrap();
        let engine = open_page(&dir);
        let source = ExportSource {
            engine: &engine,
            page: 0,
            region: Rect::from_xywh(0.0, 0.0, 30.0, 20.0),
            vector: None,
        };
        let strategy = RenderStrategy::select(&source, None);

        for (w, h) in [(64, 43), (7, 5), (1, 1)] {
            let img = strategy.render(w, h).unwrap();
            assert_eq!(img.dimensions(), (w, h));
        }
        let img = strategy.render(30, 20).unwrap();
        assert_eq!(img.get_pixel(15, 10).0, [0, 128, 0, 255]);
    }
}
