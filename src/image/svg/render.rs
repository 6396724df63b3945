//! Vector rasterizers.
//!
//! The rasterizer is an optional capability. It is probed once per export
//! run; when none is available the caller re-renders the page instead.
//!
//! | Backend   | How                                   |
//! |-----------|---------------------------------------|
//! | `builtin` | usvg + resvg, in process              |
//! | `magick`  | ImageMagick CLI over stdin/stdout     |

use std::fmt;

use image::{ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use thiserror::Error;

use crate::config::RasterizerChoice;
use crate::utils::exec::Cmd;

#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("failed to parse svg: {0}")]
    Parse(#[from] usvg::Error),

    #[error("cannot allocate a {0}x{1} pixmap")]
    Pixmap(u32, u32),

    #[error("{0}")]
    Command(String),

    #[error("failed to decode rasterizer output: {0}")]
    Decode(#[from] image::ImageError),
}

/// usvg options with system fonts loaded.
pub fn load_options() -> usvg::Options<'static> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    options
}

/// Copy a premultiplied pixmap into a straight-alpha RGBA image.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

/// Render a parsed tree through `transform` into a `width`x`height` image.
pub fn render_tree(
    tree: &usvg::Tree,
    transform: Transform,
    width: u32,
    height: u32,
) -> Result<RgbaImage, RasterizeError> {
    let mut pixmap = Pixmap::new(width, height).ok_or(RasterizeError::Pixmap(width, height))?;
    resvg::render(tree, transform, &mut pixmap.as_mut());
    Ok(pixmap_to_rgba(&pixmap))
}

/// An available vector rasterizer.
pub enum VectorRasterizer {
    Builtin(Box<usvg::Options<'static>>),
    Magick,
}

impl fmt::Debug for VectorRasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl VectorRasterizer {
    /// Resolve the configured backend, or `None` when it can't be used.
    pub fn probe(choice: RasterizerChoice) -> Option<Self> {
        match choice {
            RasterizerChoice::Builtin => Some(Self::Builtin(Box::new(load_options()))),
            RasterizerChoice::Magick => which::which("magick").ok().map(|_| Self::Magick),
            RasterizerChoice::None => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Builtin(_) => "builtin",
            Self::Magick => "magick",
        }
    }

    /// Rasterize vector text to exactly `width`x`height` pixels.
    pub fn render(&self, svg: &str, width: u32, height: u32) -> Result<RgbaImage, RasterizeError> {
        match self {
            Self::Builtin(options) => render_builtin(svg, options, width, height),
            Self::Magick => render_magick(svg, width, height),
        }
    }
}

fn render_builtin(
    svg: &str,
    options: &usvg::Options<'static>,
    width: u32,
    height: u32,
) -> Result<RgbaImage, RasterizeError> {
    let tree = usvg::Tree::from_str(svg, options)?;
    let size = tree.size();
    let transform = Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    render_tree(&tree, transform, width, height)
}

/// Density that makes ImageMagick rasterize `svg` at `width` pixels wide,
/// given that it maps one CSS pixel to one pixel at 96 dpi.
fn magick_density(svg: &str, width: u32) -> Result<f64, RasterizeError> {
    let tree = usvg::Tree::from_str(svg, &usvg::Options::default())?;
    Ok(96.0 * f64::from(width) / f64::from(tree.size().width()))
}

fn render_magick(svg: &str, width: u32, height: u32) -> Result<RgbaImage, RasterizeError> {
    let density = format!("{:.3}", magick_density(svg, width)?);
    // Only absorbs rounding and non-uniform scaling after the rasterize.
    let geometry = format!("{width}x{height}!");
    let output = Cmd::new("magick")
        .args(["-background", "none", "-density", &density, "svg:-"])
        .args(["-resize", &geometry, "png:-"])
        .stdin(svg)
        .run()
        .map_err(|e| RasterizeError::Command(format!("{e:#}")))?;

    let img = image::load_from_memory_with_format(&output.stdout, ImageFormat::Png)?;
    Ok(img.to_rgba8())
}
