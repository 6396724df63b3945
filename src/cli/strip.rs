//! `strip` command: background removal on a standalone SVG file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::common::strip_vector;
use crate::config::AppConfig;
use crate::image::svg::VectorDocument;
use crate::{debug, log};

/// Execute strip command
pub fn run_strip(
    input: &Path,
    size: Option<(u32, u32)>,
    output: Option<&Path>,
    config: &AppConfig,
) -> Result<()> {
    let text =
        fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))?;

    let canvas = match size {
        Some((w, h)) => (f64::from(w), f64::from(h)),
        None => match VectorDocument::parse(&text).ok().and_then(|d| d.canvas_size()) {
            Some(canvas) => canvas,
            None => bail!("{} declares no size, pass --size WxH", input.display()),
        },
    };

    let outcome = strip_vector(&text, canvas, config);
    if !outcome.changed() {
        debug!("strip"; "{} left as is", input.display());
    }
    match output {
        Some(path) => {
            fs::write(path, &outcome.text)
                .with_context(|| format!("cannot write {}", path.display()))?;
            log!("strip"; "{}", path.display());
        }
        None => print!("{}", outcome.text),
    }
    Ok(())
}
