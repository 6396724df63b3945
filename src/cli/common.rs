//! Common helpers shared across CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::args::SelectArgs;
use crate::config::AppConfig;
use crate::export::InputError;
use crate::geometry::Point;
use crate::image::svg::{StripMethod, StripOutcome, VectorDocument, strip_background};
use crate::selection::{AspectPreset, AspectSettings, parse_ratio};
use crate::session::Session;
use crate::utils::path::file_stem_or;
use crate::{debug, log};

/// Resolve `--aspect`/`--ratio`, rejecting malformed values up front.
pub fn aspect_settings(args: &SelectArgs) -> Result<AspectSettings, InputError> {
    let preset = match args.aspect.as_deref() {
        Some(name) => name.parse::<AspectPreset>()?,
        None => AspectPreset::Free,
    };
    if let Some(ratio) = args.ratio.as_deref() {
        parse_ratio(ratio)?;
    }
    Ok(AspectSettings::new(preset, args.ratio.clone()))
}

/// Open `input`, show the requested page and replay the selection gesture.
pub fn open_session(input: &Path, args: &SelectArgs, config: &AppConfig) -> Result<Session> {
    let aspect = aspect_settings(args)?;

    let mut session = Session::new(config.view.zoom, config.view.viewport());
    session
        .open(input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    if args.page > 1 {
        session
            .show_page(args.page - 1)
            .with_context(|| format!("cannot show page {}", args.page))?;
    }
    session.set_aspect(aspect);

    if let (Some(from), Some(to)) = (args.from, args.to) {
        session.press(Point::new(from.0, from.1));
        for &(x, y) in &args.drag {
            session.drag(Point::new(x, y));
        }
        session.release(Point::new(to.0, to.1));
    }

    let rect = session.selection_rect()?;
    if let Some(mapper) = session.mapper() {
        debug!("select"; "page {} region {} (canvas {})", args.page, rect, mapper.rect_to_canvas(rect));
    }
    Ok(session)
}

/// Canvas of vector text: its viewBox (or size), else `fallback`.
pub fn canvas_of(text: &str, fallback: (f64, f64)) -> (f64, f64) {
    VectorDocument::parse(text)
        .ok()
        .and_then(|doc| doc.canvas_size())
        .unwrap_or(fallback)
}

/// Run the background stripper and log what it did.
pub fn strip_vector(text: &str, canvas: (f64, f64), config: &AppConfig) -> StripOutcome {
    let outcome = strip_background(text, canvas, &config.strip.options());
    match outcome.method {
        StripMethod::Neutralized(n) => {
            log!("strip"; "background neutralized ({} shape{})", n, crate::utils::plural::plural_s(n));
        }
        StripMethod::PatternDeleted(n) => {
            log!("strip"; "background removed ({} tag{})", n, crate::utils::plural::plural_s(n));
        }
        StripMethod::AlreadyStripped => debug!("strip"; "background already transparent"),
        StripMethod::Unchanged => log!("strip"; "no background found"),
    }
    outcome
}

/// `explicit`, or `{input stem}.{ext}` in the current directory.
pub fn output_path(explicit: Option<&Path>, input: &Path, ext: &str) -> PathBuf {
    explicit.map_or_else(
        || PathBuf::from(format!("{}.{ext}", file_stem_or(input, "extracted"))),
        Path::to_path_buf,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::selection::AspectConstraint;
    use clap::Parser;
    use tempfile::TempDir;

    fn select_args(argv: &[&str]) -> SelectArgs {
        let mut full = vec!["pagecut", "svg", "doc.svg"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Svg { select, .. } => select,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_aspect_settings() {
        let settings = aspect_settings(&select_args(&["--aspect", "4:3"])).unwrap();
        assert_eq!(settings.constraint(), AspectConstraint::Ratio(4.0 / 3.0));

        let settings = aspect_settings(&select_args(&["--aspect", "1:1", "--ratio", "2"])).unwrap();
        assert_eq!(settings.constraint(), AspectConstraint::Ratio(2.0));

        assert!(matches!(
            aspect_settings(&select_args(&["--ratio", "4:0"])),
            Err(InputError::Aspect(_))
        ));
        assert!(aspect_settings(&select_args(&["--aspect", "5:4"])).is_err());
    }

    #[test]
    fn test_wide_preset_gesture() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.svg");
        std::fs::write(
            &path,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="800"/>"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.view.zoom = 1.0;
        let args = select_args(&["--aspect", "16:9", "--from", "100,100", "--to", "500,160"]);
        let session = open_session(&path, &args, &config).unwrap();

        // Horizontal delta dominates: width 400, height 400 / (16/9) = 225.
        let rect = session.selection_rect().unwrap();
        assert_eq!((rect.x0, rect.y0), (100.0, 100.0));
        assert!((rect.width() - 400.0).abs() < 1e-9);
        assert!((rect.height() - 225.0).abs() < 1e-9);
        assert!((rect.width() / rect.height() - 16.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(None, Path::new("dir/logo.svg"), "png"),
            PathBuf::from("logo.png")
        );
        assert_eq!(
            output_path(Some(Path::new("a.svg")), Path::new("logo.svg"), "svg"),
            PathBuf::from("a.svg")
        );
    }
}
