use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

use super::*;
use crate::engine::{EngineError, PageEngine, Scale, SvgEngine};
use crate::geometry::{Document, Rect};
use crate::image::svg::VectorRasterizer;

/// Solid blue page that refuses to render wider than `max_width` pixels.
struct StubEngine {
    bounds: Rect<Document>,
    max_width: u32,
}

impl PageEngine for StubEngine {
    fn path(&self) -> &Path {
        Path::new("stub.svg")
    }

    fn page_count(&self) -> usize {
        1
    }

    fn page_bounds(&self, _page: usize) -> Result<Rect<Document>, EngineError> {
        Ok(self.bounds)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(
        &self,
        _page: usize,
        scale: Scale,
        clip: Option<Rect<Document>>,
    ) -> Result<RgbaImage, EngineError> {
        let region = clip.unwrap_or(self.bounds);
        let width = (region.width() * scale.x).round() as u32;
        let height = (region.height() * scale.y).round() as u32;
        if width > self.max_width {
            return Err(EngineError::EmptyClip(region));
        }
        Ok(RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255])))
    }

    fn extract_vector(&self, _page: usize, _clip: Rect<Document>) -> Result<String, EngineError> {
        Ok(String::new())
    }
}

#[derive(Default)]
struct Recorder {
    files: usize,
    skips: usize,
    sizes: Vec<u32>,
}

impl ExportObserver for Recorder {
    fn file_written(&mut self, _path: &Path, _manifest: &ExportManifest) {
        self.files += 1;
    }

    fn file_skipped(&mut self, _asset: &SkippedAsset, _manifest: &ExportManifest) {
        self.skips += 1;
    }

    fn size_done(&mut self, size: u32, _manifest: &ExportManifest) {
        self.sizes.push(size);
    }
}

fn stub(width: f64, height: f64, max_width: u32) -> StubEngine {
    StubEngine {
        bounds: Rect::from_xywh(0.0, 0.0, width, height),
        max_width,
    }
}

fn page_source(engine: &StubEngine) -> ExportSource<'_> {
    ExportSource {
        engine,
        page: 0,
        region: engine.bounds,
        vector: None,
    }
}

fn names(manifest: &ExportManifest) -> Vec<String> {
    manifest
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn job(dir: &TempDir, size: (f64, f64), sizes: &[u32], formats: &[ExportFormat]) -> ExportJob {
    ExportJob::new(
        sizes.iter().copied(),
        formats.iter().copied(),
        Some(dir.path().join("out")),
        "logo",
    )
    .unwrap()
    .for_source(size)
}

#[test]
fn test_job_validation() {
    let dir = Some(PathBuf::from("out"));
    assert!(matches!(
        ExportJob::new(Vec::new(), [ExportFormat::Png], dir.clone(), "a"),
        Err(InputError::NoSizes)
    ));
    assert!(matches!(
        ExportJob::new([0], [ExportFormat::Png], dir.clone(), "a"),
        Err(InputError::NoSizes)
    ));
    assert!(matches!(
        ExportJob::new([16], Vec::new(), dir, "a"),
        Err(InputError::NoFormats)
    ));
    assert!(matches!(
        ExportJob::new([16], [ExportFormat::Png], None, "a"),
        Err(InputError::NoOutputDir)
    ));
}

#[test]
fn test_job_normalizes_sets() {
    let job = ExportJob::new(
        [64, 16, 64],
        [ExportFormat::Ico, ExportFormat::Png, ExportFormat::Ico],
        Some(PathBuf::from("out")),
        "  ",
    )
    .unwrap();
    assert_eq!(job.sizes(), &[16, 64]);
    assert_eq!(job.formats(), &[ExportFormat::Png, ExportFormat::Ico]);
    assert_eq!(job.base_name(), "extracted");
    assert_eq!(job.total(), 5);
    assert_eq!(
        job.asset_path(16, 8, ExportFormat::Ico),
        Path::new("out").join("extracted_16x8.ico")
    );
}

#[test]
fn test_size_fan_out_keeps_aspect() {
    let dir = TempDir::new().unwrap();
    let engine = stub(1000.0, 400.0, 10_000);
    let job = job(&dir, (1000.0, 400.0), &[500], &[ExportFormat::Png]);

    let manifest = ExportPipeline::new(&page_source(&engine), None).run(&job, &mut ());

    assert!(!manifest.aborted());
    assert_eq!(names(&manifest), ["logo_500x200.png", "logo_1000x400.png"]);
    let img = image::open(&manifest.written[0]).unwrap();
    assert_eq!((img.width(), img.height()), (500, 200));
}

#[test]
fn test_icon_size_limit() {
    let dir = TempDir::new().unwrap();
    let engine = stub(100.0, 100.0, 10_000);
    let job = job(&dir, (100.0, 100.0), &[200, 300], &[ExportFormat::Ico]);

    let mut recorder = Recorder::default();
    let manifest = ExportPipeline::new(&page_source(&engine), None).run(&job, &mut recorder);

    assert!(!manifest.aborted());
    assert_eq!(names(&manifest), ["logo_200x200.ico", "logo_100x100.png"]);
    assert_eq!(manifest.skipped.len(), 1);
    assert_eq!(
        (manifest.skipped[0].width, manifest.skipped[0].height),
        (300, 300)
    );
    assert!(manifest.skipped[0].reason.contains("256"));
    assert!(!dir.path().join("out/logo_300x300.ico").exists());

    assert_eq!(manifest.progress, manifest.total);
    assert_eq!((recorder.files, recorder.skips), (2, 1));
    assert_eq!(recorder.sizes, [200, 300]);
}

#[test]
fn test_failure_keeps_partial_results() {
    let dir = TempDir::new().unwrap();
    let engine = stub(80.0, 40.0, 100);
    let job = job(&dir, (80.0, 40.0), &[32, 64, 128, 256], &[ExportFormat::Png]);

    let mut recorder = Recorder::default();
    let manifest = ExportPipeline::new(&page_source(&engine), None).run(&job, &mut recorder);

    assert!(matches!(
        manifest.failure,
        Some(ExportError::Render { width: 128, height: 64, .. })
    ));
    // 256 was never attempted; the native size still runs.
    assert_eq!(
        names(&manifest),
        ["logo_32x16.png", "logo_64x32.png", "logo_80x40.png"]
    );
    assert_eq!(recorder.sizes, [32, 64]);
    for path in &manifest.written {
        assert!(path.exists(), "{}", path.display());
    }
}

#[test]
fn test_progress_completes_without_native_file() {
    let dir = TempDir::new().unwrap();

    // Sub-pixel region: the native step has nothing to write.
    let engine = stub(0.4, 0.4, 10_000);
    let tiny = job(&dir, (0.4, 0.4), &[16], &[ExportFormat::Png]);
    let manifest = ExportPipeline::new(&page_source(&engine), None).run(&tiny, &mut ());
    assert_eq!(names(&manifest), ["logo_16x16.png"]);
    assert_eq!(manifest.progress, tiny.total());

    // Native render fails after every size succeeded.
    let engine = stub(80.0, 40.0, 50);
    let wide = job(&dir, (80.0, 40.0), &[32], &[ExportFormat::Png]);
    let manifest = ExportPipeline::new(&page_source(&engine), None).run(&wide, &mut ());
    assert!(!manifest.aborted());
    assert_eq!(names(&manifest), ["logo_32x16.png"]);
    assert_eq!(manifest.progress, wide.total());
}

#[test]
fn test_all_formats_written() {
    let dir = TempDir::new().unwrap();
    let engine = stub(40.0, 20.0, 10_000);
    let job = job(&dir, (40.0, 20.0), &[16], &ExportFormat::ALL);

    let manifest = ExportPipeline::new(&page_source(&engine), None).run(&job, &mut ());

    assert_eq!(
        names(&manifest),
        [
            "logo_16x8.png",
            "logo_16x8.webp",
            "logo_16x8.jpg",
            "logo_16x8.ico",
            "logo_40x20.png"
        ]
    );
    assert_eq!(manifest.progress, job.total());
}

#[test]
fn test_vector_strategy_with_background_removal() {
    let dir = TempDir::new().unwrap();
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40"><rect width="40" height="40" fill="white"/><rect x="10" y="10" width="20" height="20" fill="red"/></svg>"#;
    let path = dir.path().join("page.svg");
    std::fs::write(&path, svg).unwrap();
    let engine = SvgEngine::open(&path).unwrap();
    let rasterizer = VectorRasterizer::Builtin(Box::default());

    let source = ExportSource {
        engine: &engine,
        page: 0,
        region: Rect::from_xywh(0.0, 0.0, 40.0, 40.0),
        vector: Some(svg),
    };
    let pipeline = ExportPipeline::new(&source, Some(&rasterizer));
    assert_eq!(pipeline.strategy().name(), "builtin");

    let job = job(&dir, (40.0, 40.0), &[80], &[ExportFormat::Png]).with_background_removal(true);
    let manifest = pipeline.run(&job, &mut ());

    assert!(!manifest.aborted());
    let img = image::open(&manifest.written[0]).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (80, 80));
    assert_eq!(img.get_pixel(2, 2)[3], 0);
    assert_eq!(img.get_pixel(40, 40).0, [255, 0, 0, 255]);
}

#[test]
fn test_unwritable_output_dir() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "x").unwrap();
    let engine = stub(10.0, 10.0, 100);
    let job = ExportJob::new([8], [ExportFormat::Png], Some(blocker.join("out")), "a")
        .unwrap()
        .for_source((10.0, 10.0));

    let manifest = ExportPipeline::new(&page_source(&engine), None).run(&job, &mut ());
    assert!(matches!(manifest.failure, Some(ExportError::CreateDir(..))));
    assert!(manifest.written.is_empty());
}

#[test]
fn test_error_chain() {
    let err = ExportError::Render {
        width: 1,
        height: 2,
        source: RenderError::Page(EngineError::PageOutOfRange { page: 3, count: 1 }),
    };
    assert_eq!(
        error_chain(&err),
        "failed to render 1x2: page 3 is out of range (document has 1)"
    );
}
