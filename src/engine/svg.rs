//! SVG-backed page engine.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use resvg::tiny_skia::Transform;

use super::{EngineError, PageEngine, Scale};
use crate::geometry::{Document, Rect};
use crate::image::svg::{VectorDocument, load_options, render_tree};

struct SvgPage {
    source: String,
    tree: usvg::Tree,
}

pub struct SvgEngine {
    path: PathBuf,
    pages: Vec<SvgPage>,
}

impl SvgEngine {
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let files = page_files(path)?;
        if files.is_empty() {
            return Err(EngineError::Empty(path.to_path_buf()));
        }

        let options = load_options();
        let pages = files
            .into_iter()
            .map(|file| {
                let source =
                    fs::read_to_string(&file).map_err(|e| EngineError::Io(file.clone(), e))?;
                let tree = usvg::Tree::from_str(&source, &options)
                    .map_err(|source| EngineError::Parse { path: file, source })?;
                Ok(SvgPage { source, tree })
            })
            .collect::<Result<_, EngineError>>()?;

        Ok(Self {
            path: path.to_path_buf(),
            pages,
        })
    }

    fn page(&self, page: usize) -> Result<&SvgPage, EngineError> {
        self.pages.get(page).ok_or(EngineError::PageOutOfRange {
            page,
            count: self.pages.len(),
        })
    }

    /// `clip` (or the page) clamped to the page; empty regions are errors.
    fn region(
        &self,
        page: usize,
        clip: Option<Rect<Document>>,
    ) -> Result<Rect<Document>, EngineError> {
        let bounds = self.page_bounds(page)?;
        let region = clip.unwrap_or(bounds).clamp_to(&bounds);
        if region.is_empty() {
            return Err(EngineError::EmptyClip(region));
        }
        Ok(region)
    }
}

/// A single `.svg` file, or the `.svg` files of a directory sorted by name.
fn page_files(path: &Path) -> Result<Vec<PathBuf>, EngineError> {
    let is_svg = |p: &Path| {
        p.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    };

    if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|e| EngineError::Io(path.to_path_buf(), e))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_svg(p))
            .collect();
        files.sort();
        Ok(files)
    } else if is_svg(path) {
        Ok(vec![path.to_path_buf()])
    } else if path.exists() {
        Err(EngineError::Unsupported(path.to_path_buf()))
    } else {
        Err(EngineError::Io(
            path.to_path_buf(),
            std::io::ErrorKind::NotFound.into(),
        ))
    }
}

impl PageEngine for SvgEngine {
    fn path(&self) -> &Path {
        &self.path
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_bounds(&self, page: usize) -> Result<Rect<Document>, EngineError> {
        let size = self.page(page)?.tree.size();
        Ok(Rect::from_xywh(
            0.0,
            0.0,
            f64::from(size.width()),
            f64::from(size.height()),
        ))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(
        &self,
        page: usize,
        scale: Scale,
        clip: Option<Rect<Document>>,
    ) -> Result<RgbaImage, EngineError> {
        let region = self.region(page, clip)?;
        let width = (region.width() * scale.x).round().max(1.0) as u32;
        let height = (region.height() * scale.y).round().max(1.0) as u32;

        let transform = Transform::from_row(
            scale.x as f32,
            0.0,
            0.0,
            scale.y as f32,
            (-region.x0 * scale.x) as f32,
            (-region.y0 * scale.y) as f32,
        );
        Ok(render_tree(&self.page(page)?.tree, transform, width, height)?)
    }

    fn extract_vector(&self, page: usize, clip: Rect<Document>) -> Result<String, EngineError> {
        let region = self.region(page, Some(clip))?;
        let bounds = self.page_bounds(page)?;

        // Scratch copy of the page; only its root viewport is rewritten.
        let mut doc = VectorDocument::parse(&self.page(page)?.source)?;
        let [vx, vy, vw, vh] = doc
            .view_box()
            .unwrap_or([0.0, 0.0, bounds.width(), bounds.height()]);
        let sx = vw / bounds.width();
        let sy = vh / bounds.height();

        let view_box = format!(
            "{} {} {} {}",
            fmt_num(vx + region.x0 * sx),
            fmt_num(vy + region.y0 * sy),
            fmt_num(region.width() * sx),
            fmt_num(region.height() * sy),
        );
        let width = fmt_num(region.width());
        let height = fmt_num(region.height());
        doc.set_root_attrs(&[
            ("viewBox", Some(view_box.as_str())),
            ("width", Some(width.as_str())),
            ("height", Some(height.as_str())),
            ("preserveAspectRatio", Some("none")),
        ])?;

        Ok(doc.to_text()?)
    }
}

/// Shortest decimal form with at most 4 fractional digits.
fn fmt_num(v: f64) -> String {
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
