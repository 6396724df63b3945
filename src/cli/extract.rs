//! `svg` and `png` commands: one-off extraction of the selected region.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::common::{canvas_of, open_session, output_path, strip_vector};
use crate::cli::args::SelectArgs;
use crate::config::AppConfig;
use crate::export::{ExportFormat, encode};
use crate::image::background::remove_white_background;
use crate::log;

/// Execute svg command
pub fn run_svg(
    input: &Path,
    select: &SelectArgs,
    output: Option<&Path>,
    nobg: bool,
    config: &AppConfig,
) -> Result<()> {
    let mut session = open_session(input, select, config)?;
    let extraction = session.extract_vector().context("vector extraction failed")?;

    let text = if nobg {
        let canvas = canvas_of(&extraction.text, extraction.size());
        strip_vector(&extraction.text, canvas, config).text
    } else {
        extraction.text.clone()
    };

    let path = output_path(output, input, "svg");
    fs::write(&path, text).with_context(|| format!("cannot write {}", path.display()))?;
    let (w, h) = extraction.size();
    log!("svg"; "{} ({w:.1} x {h:.1})", path.display());
    Ok(())
}

/// Execute png command
pub fn run_png(
    input: &Path,
    select: &SelectArgs,
    output: Option<&Path>,
    nobg: bool,
    config: &AppConfig,
) -> Result<()> {
    let session = open_session(input, select, config)?;
    let zoom = f64::from(config.view.dpi) / 72.0;
    let mut img = session
        .rasterize_selection(zoom)
        .context("rasterization failed")?;
    if nobg {
        remove_white_background(&mut img, config.strip.white_threshold);
    }

    let path = output_path(output, input, "png");
    let bytes = encode(&img, ExportFormat::Png, config.export.jpeg_quality)
        .context("png encoding failed")?;
    fs::write(&path, bytes).with_context(|| format!("cannot write {}", path.display()))?;
    log!("png"; "{} ({}x{}, {} dpi)", path.display(), img.width(), img.height(), config.view.dpi);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::image::svg::VectorDocument;
    use clap::Parser;
    use tempfile::TempDir;

    const PAGE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="200"><rect width="300" height="200" fill="#fff"/><circle cx="150" cy="100" r="40" fill="black"/></svg>"##;

    fn select(argv: &[&str]) -> SelectArgs {
        let mut full = vec!["pagecut", "png", "page.svg"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Png { select, .. } => select,
            _ => unreachable!(),
        }
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.view.zoom = 1.0;
        config.view.viewport = [300, 200];
        config
    }

    #[test]
    fn test_svg_with_background_removed() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.svg");
        fs::write(&input, PAGE).unwrap();
        let output = dir.path().join("cut.svg");

        run_svg(&input, &select(&[]), Some(&output), true, &config()).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        let doc = VectorDocument::parse(&text).unwrap();
        let rect = doc.shapes().next().unwrap();
        assert_eq!(rect.attr("fill").as_deref(), Some("none"));
        assert!(text.contains(r#"fill="black""#));
    }

    #[test]
    fn test_png_at_dpi() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.svg");
        fs::write(&input, PAGE).unwrap();
        let output = dir.path().join("cut.png");

        let mut config = config();
        config.view.dpi = 144;
        let args = select(&["--from", "0,0", "--to", "100,50"]);
        run_png(&input, &args, Some(&output), true, &config).unwrap();

        let img = image::open(&output).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (200, 100));
        // White page corner became transparent.
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }
}
