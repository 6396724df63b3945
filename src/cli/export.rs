//! `export` command: batch export of the selected region.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use super::common::{canvas_of, open_session, strip_vector};
use crate::cli::args::{ExportArgs, SelectArgs};
use crate::config::{AppConfig, RasterizerChoice};
use crate::export::{
    ExportJob, ExportManifest, ExportObserver, ExportPipeline, ExportSource, SkippedAsset,
    parse_custom_sizes,
};
use crate::image::svg::VectorRasterizer;
use crate::logger::ProgressLine;
use crate::utils::path::{expand_path, file_stem_or};
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// Keeps the progress line in step with the manifest.
struct ProgressObserver {
    progress: ProgressLine,
}

impl ExportObserver for ProgressObserver {
    fn file_written(&mut self, _path: &Path, manifest: &ExportManifest) {
        self.progress.set(manifest.progress);
    }

    fn file_skipped(&mut self, _asset: &SkippedAsset, manifest: &ExportManifest) {
        self.progress.set(manifest.progress);
    }

    fn size_done(&mut self, size: u32, manifest: &ExportManifest) {
        debug!("export"; "size {} done", size);
        self.progress.set(manifest.progress);
    }
}

/// Probe the configured vector rasterizer once for this run.
fn probe_rasterizer(choice: RasterizerChoice) -> Option<VectorRasterizer> {
    let rasterizer = VectorRasterizer::probe(choice);
    match (&rasterizer, choice) {
        (Some(r), _) => debug!("export"; "vector rasterizer: {}", r.name()),
        (None, RasterizerChoice::None) => {}
        (None, _) => log!("export"; "vector rasterizer `{:?}` unavailable", choice),
    }
    rasterizer
}

/// Execute export command
///
/// Files written before a failure stay on disk and are reported; the
/// failure is returned afterwards.
pub fn run_export(
    input: &Path,
    select: &SelectArgs,
    args: &ExportArgs,
    config: &AppConfig,
) -> Result<()> {
    let custom = args
        .custom_sizes
        .as_deref()
        .map(parse_custom_sizes)
        .unwrap_or_default();
    let base_name = args
        .name
        .clone()
        .unwrap_or_else(|| file_stem_or(input, "extracted"));
    let job = ExportJob::new(
        config.export.sizes.iter().copied().chain(custom),
        config.export.formats.iter().copied(),
        args.dir.as_deref().map(expand_path),
        &base_name,
    )?
    .with_background_removal(config.export.remove_background)
    .with_jpeg_quality(config.export.jpeg_quality);

    let mut session = open_session(input, select, config)?;
    let region = session.selection_rect()?;
    let job = job.for_source((region.width(), region.height()));

    let vector = match session.extract_vector() {
        Ok(extraction) if job.remove_background() => {
            let canvas = canvas_of(&extraction.text, extraction.size());
            Some(strip_vector(&extraction.text, canvas, config).text)
        }
        Ok(extraction) => Some(extraction.text.clone()),
        Err(e) => {
            log!("warning"; "vector extraction failed: {}", e);
            None
        }
    };

    if args.vector
        && let Some(text) = &vector
    {
        fs::create_dir_all(job.output_dir())
            .with_context(|| format!("cannot create {}", job.output_dir().display()))?;
        let path = job.output_dir().join(format!("{}.svg", job.base_name()));
        fs::write(&path, text).with_context(|| format!("cannot write {}", path.display()))?;
        log!("export"; "{}", path.display());
    }

    let engine = session.engine().context("no document is open")?;
    let page = session.page().unwrap_or_default();
    let source = ExportSource {
        engine,
        page,
        region,
        vector: vector.as_deref(),
    };

    let rasterizer = probe_rasterizer(config.export.rasterizer);
    let pipeline = ExportPipeline::new(&source, rasterizer.as_ref())
        .with_white_threshold(config.strip.white_threshold);

    log!(
        "export"; "{} x {} to {}",
        plural_count(job.sizes().len(), "size"),
        plural_count(job.formats().len(), "format"),
        job.output_dir().display()
    );
    let mut observer = ProgressObserver {
        progress: ProgressLine::new("export", job.total()),
    };
    let manifest = pipeline.run(&job, &mut observer);
    observer.progress.set(manifest.progress);
    observer.progress.finish();

    report(&manifest)
}

fn report(manifest: &ExportManifest) -> Result<()> {
    for asset in &manifest.skipped {
        debug!("skip"; "{}x{}.{}: {}", asset.width, asset.height, asset.format, asset.reason);
    }
    let skipped = if manifest.skipped.is_empty() {
        String::new()
    } else {
        format!(", skipped {}", manifest.skipped.len())
    };

    match &manifest.failure {
        None => {
            log!("done"; "exported {}{}", plural_count(manifest.written.len(), "file"), skipped);
            Ok(())
        }
        Some(e) => {
            log!(
                "error"; "export aborted, kept {}{}",
                plural_count(manifest.written.len(), "file"),
                skipped
            );
            Err(anyhow!("{}", crate::export::error_chain(e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::TempDir;

    const PAGE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="200"><rect width="400" height="200" fill="white"/><rect x="100" y="50" width="200" height="100" fill="navy"/></svg>"#;

    fn parse(argv: &[&str]) -> (SelectArgs, ExportArgs, AppConfig) {
        let mut full = vec!["pagecut", "export", "page.svg"];
        full.extend_from_slice(argv);
        let cli = Cli::parse_from(full);
        let mut config = AppConfig::default();
        config.view.zoom = 1.0;
        config.view.viewport = [400, 200];
        config.apply_command_options(&cli);
        match cli.command {
            Commands::Export { select, args, .. } => (select, args, config),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_export_region_with_vector() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.svg");
        fs::write(&input, PAGE).unwrap();
        let out = dir.path().join("out");
        let out_arg = out.to_string_lossy().into_owned();

        let (select, args, config) = parse(&[
            "-d", &out_arg, "--from", "100,50", "--to", "300,150", "--sizes", "100",
            "--custom-sizes", "50，x", "--formats", "png,jpg", "--vector", "--nobg",
        ]);
        run_export(&input, &select, &args, &config).unwrap();

        for name in [
            "page_50x25.png",
            "page_50x25.jpg",
            "page_100x50.png",
            "page_100x50.jpg",
            "page_200x100.png",
            "page.svg",
        ] {
            assert!(out.join(name).is_file(), "missing {name}");
        }
        let img = image::open(out.join("page_100x50.png")).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(50, 25).0, [0, 0, 128, 255]);
    }

    #[test]
    fn test_missing_output_dir_rejected() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.svg");
        fs::write(&input, PAGE).unwrap();

        let (select, args, config) = parse(&[]);
        let err = run_export(&input, &select, &args, &config).unwrap_err();
        assert!(err.to_string().contains("output directory"));
    }

    #[test]
    fn test_job_checked_before_document_opens() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.svg");

        let (select, args, config) = parse(&["--formats", "png"]);
        let err = run_export(&missing, &select, &args, &config).unwrap_err();
        assert!(err.to_string().contains("output directory"), "{err:#}");
    }

    #[test]
    fn test_report_failure_is_error() {
        let mut manifest = ExportManifest::default();
        assert!(report(&manifest).is_ok());
        manifest.failure = Some(crate::export::ExportError::CreateDir(
            "x".into(),
            std::io::ErrorKind::PermissionDenied.into(),
        ));
        assert!(report(&manifest).is_err());
    }
}
