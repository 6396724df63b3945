//! Batch raster export.
//!
//! One run renders the selected region at every long-edge size of an
//! [`ExportJob`] and writes one file per requested format:
//!
//! ```text
//! for each size:  fit (w, h) ─► render ─► [remove background] ─► encode × formats
//! then:           native size ─► render ─► png
//! ```
//!
//! The render strategy is resolved once per run (see [`RenderStrategy`]).
//! A failure aborts the remaining sizes, but the [`ExportManifest`] built
//! so far is always returned.

mod encode;
mod format;
mod render;
mod size;

#[cfg(test)]
mod tests;

pub use encode::encode;
pub use format::ExportFormat;
pub use render::{ExportSource, RenderError, RenderStrategy};
pub use size::{fit_long_edge, normalize_sizes, parse_custom_sizes, source_pixels};

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::image::background::{DEFAULT_WHITE_THRESHOLD, remove_white_background};
use crate::image::svg::VectorRasterizer;
use crate::selection::AspectError;
use crate::{debug, log};

/// Bad user input, rejected before any work starts.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Aspect(#[from] AspectError),

    #[error("no export sizes selected")]
    NoSizes,

    #[error("no export formats selected")]
    NoFormats,

    #[error("no output directory given")]
    NoOutputDir,

    #[error("unknown format `{0}` (expected png, webp, jpg or ico)")]
    UnknownFormat(String),

    #[error("invalid {what} `{value}`")]
    Malformed { what: &'static str, value: String },
}

/// Failure while producing one asset.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot create output directory `{0}`")]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("failed to render {width}x{height}")]
    Render {
        width: u32,
        height: u32,
        #[source]
        source: RenderError,
    },

    #[error("failed to encode `{path}`")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot write `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A validated export request.
#[derive(Debug, Clone)]
pub struct ExportJob {
    source_size: (f64, f64),
    sizes: Vec<u32>,
    formats: Vec<ExportFormat>,
    output_dir: PathBuf,
    base_name: String,
    remove_background: bool,
    jpeg_quality: u8,
}

impl ExportJob {
    /// Validate and build a job.
    ///
    /// Sizes are deduplicated and sorted; formats keep [`ExportFormat::ALL`]
    /// order. An empty base name becomes `extracted`. The source size starts
    /// at zero until [`for_source`](Self::for_source) sets it.
    pub fn new(
        sizes: impl IntoIterator<Item = u32>,
        formats: impl IntoIterator<Item = ExportFormat>,
        output_dir: Option<PathBuf>,
        base_name: &str,
    ) -> Result<Self, InputError> {
        let sizes = normalize_sizes(sizes);
        if sizes.is_empty() {
            return Err(InputError::NoSizes);
        }

        let requested: Vec<ExportFormat> = formats.into_iter().collect();
        let formats: Vec<ExportFormat> = ExportFormat::ALL
            .into_iter()
            .filter(|f| requested.contains(f))
            .collect();
        if formats.is_empty() {
            return Err(InputError::NoFormats);
        }

        let output_dir = output_dir.ok_or(InputError::NoOutputDir)?;
        let base_name = match base_name.trim() {
            "" => "extracted".to_string(),
            name => name.to_string(),
        };

        Ok(Self {
            source_size: (0.0, 0.0),
            sizes,
            formats,
            output_dir,
            base_name,
            remove_background: false,
            jpeg_quality: 95,
        })
    }

    /// Size of the selected region in document units.
    pub fn for_source(mut self, source_size: (f64, f64)) -> Self {
        self.source_size = source_size;
        self
    }

    pub fn with_background_removal(mut self, enabled: bool) -> Self {
        self.remove_background = enabled;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn source_size(&self) -> (f64, f64) {
        self.source_size
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    pub fn formats(&self) -> &[ExportFormat] {
        &self.formats
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn remove_background(&self) -> bool {
        self.remove_background
    }

    /// `{base}_{w}x{h}.{ext}` inside the output directory.
    pub fn asset_path(&self, width: u32, height: u32, format: ExportFormat) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{width}x{height}.{}",
            self.base_name,
            format.extension()
        ))
    }

    /// Planned progress units: every (size, format) pair plus the
    /// native-size PNG.
    pub fn total(&self) -> usize {
        self.sizes.len() * self.formats.len() + 1
    }
}

/// An asset that was deliberately not written.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAsset {
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
    pub reason: String,
}

/// What one run produced.
#[derive(Debug, Default)]
pub struct ExportManifest {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedAsset>,
    /// Progress units done (written or skipped).
    pub progress: usize,
    pub total: usize,
    /// The error that aborted the size loop, if any.
    pub failure: Option<ExportError>,
}

impl ExportManifest {
    pub fn aborted(&self) -> bool {
        self.failure.is_some()
    }

    fn record(&mut self, path: PathBuf) {
        if !self.written.contains(&path) {
            self.written.push(path);
        }
        self.progress += 1;
    }
}

/// Progress callbacks, invoked after every file and every size.
pub trait ExportObserver {
    fn file_written(&mut self, _path: &Path, _manifest: &ExportManifest) {}

    fn file_skipped(&mut self, _asset: &SkippedAsset, _manifest: &ExportManifest) {}

    fn size_done(&mut self, _size: u32, _manifest: &ExportManifest) {}
}

impl ExportObserver for () {}

/// Synchronous export runner.
pub struct ExportPipeline<'a> {
    strategy: RenderStrategy<'a>,
    white_threshold: u8,
}

impl<'a> ExportPipeline<'a> {
    /// Resolve the render strategy for `source`.
    ///
    /// `rasterizer` is the result of probing once for this run; `None`
    /// selects the page fallback.
    pub fn new(source: &ExportSource<'a>, rasterizer: Option<&'a VectorRasterizer>) -> Self {
        let strategy = RenderStrategy::select(source, rasterizer);
        match &strategy {
            RenderStrategy::Vector { .. } => {
                debug!("export"; "rendering with {} rasterizer", strategy.name());
            }
            RenderStrategy::Page { .. } => {
                log!("export"; "no vector rasterizer available, re-rendering the page region");
            }
        }
        Self {
            strategy,
            white_threshold: DEFAULT_WHITE_THRESHOLD,
        }
    }

    pub fn with_white_threshold(mut self, threshold: u8) -> Self {
        self.white_threshold = threshold;
        self
    }

    pub fn strategy(&self) -> &RenderStrategy<'a> {
        &self.strategy
    }

    /// Run `job` to completion or first failure.
    pub fn run(&self, job: &ExportJob, observer: &mut dyn ExportObserver) -> ExportManifest {
        let mut manifest = ExportManifest {
            total: job.total(),
            ..Default::default()
        };

        if let Err(e) = fs::create_dir_all(job.output_dir()) {
            manifest.failure = Some(ExportError::CreateDir(job.output_dir().to_path_buf(), e));
            return manifest;
        }

        let source = source_pixels(job.source_size());
        for &target in job.sizes() {
            let (width, height) = fit_long_edge(source, target);
            if let Err(e) = self.export_size(job, width, height, &mut manifest, observer) {
                log!("error"; "size {target} failed, stopping: {}", error_chain(&e));
                manifest.failure = Some(e);
                break;
            }
            observer.size_done(target, &manifest);
        }

        self.export_native(job, source, &mut manifest, observer);
        manifest
    }

    fn export_size(
        &self,
        job: &ExportJob,
        width: u32,
        height: u32,
        manifest: &mut ExportManifest,
        observer: &mut dyn ExportObserver,
    ) -> Result<(), ExportError> {
        let img = self.render(job, width, height)?;

        for &format in job.formats() {
            if let Some(max) = format.max_dimension().filter(|_| !format.fits(width, height)) {
                let asset = SkippedAsset {
                    width,
                    height,
                    format,
                    reason: format!("{format} supports at most {max}x{max}"),
                };
                log!("skip"; "{width}x{height}.{format}: {}", asset.reason);
                manifest.progress += 1;
                observer.file_skipped(&asset, manifest);
                manifest.skipped.push(asset);
                continue;
            }

            let path = job.asset_path(width, height, format);
            write_asset(&img, format, job.jpeg_quality, &path)?;
            log!("export"; "{}", display_name(&path));
            manifest.record(path);
            if let Some(path) = manifest.written.last() {
                observer.file_written(path, manifest);
            }
        }
        Ok(())
    }

    /// PNG at the source's own pixel size. Failures here are reported but
    /// never abort the run. The step always counts as one progress unit.
    fn export_native(
        &self,
        job: &ExportJob,
        (width, height): (u32, u32),
        manifest: &mut ExportManifest,
        observer: &mut dyn ExportObserver,
    ) {
        if width == 0 || height == 0 {
            debug!("export"; "source has no pixel size, skipping native export");
            manifest.progress += 1;
            return;
        }

        let path = job.asset_path(width, height, ExportFormat::Png);
        let result = self
            .render(job, width, height)
            .and_then(|img| write_asset(&img, ExportFormat::Png, job.jpeg_quality, &path));
        match result {
            Ok(()) => {
                log!("export"; "{} (native size)", display_name(&path));
                manifest.record(path);
                if let Some(path) = manifest.written.last() {
                    observer.file_written(path, manifest);
                }
            }
            Err(e) => {
                log!("warning"; "native size export failed: {}", error_chain(&e));
                manifest.progress += 1;
            }
        }
    }

    fn render(&self, job: &ExportJob, width: u32, height: u32) -> Result<RgbaImage, ExportError> {
        let mut img = self
            .strategy
            .render(width, height)
            .map_err(|source| ExportError::Render {
                width,
                height,
                source,
            })?;
        if job.remove_background() {
            remove_white_background(&mut img, self.white_threshold);
        }
        Ok(img)
    }
}

fn write_asset(
    img: &RgbaImage,
    format: ExportFormat,
    jpeg_quality: u8,
    path: &Path,
) -> Result<(), ExportError> {
    let bytes = encode(img, format, jpeg_quality).map_err(|source| ExportError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// `error: cause: cause` on one line.
pub fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
