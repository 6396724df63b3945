//! `info` command: page count and page sizes.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::engine::{self, PageEngine};
use crate::log;
use crate::utils::plural::plural_count;

#[derive(Debug, Serialize)]
struct PageInfo {
    page: usize,
    width: f64,
    height: f64,
}

#[derive(Debug, Serialize)]
struct DocumentInfo {
    path: String,
    pages: Vec<PageInfo>,
}

fn describe(engine: &dyn PageEngine) -> Result<DocumentInfo> {
    let pages = (0..engine.page_count())
        .map(|index| -> Result<PageInfo> {
            let bounds = engine.page_bounds(index)?;
            Ok(PageInfo {
                page: index + 1,
                width: bounds.width(),
                height: bounds.height(),
            })
        })
        .collect::<Result<_>>()?;

    Ok(DocumentInfo {
        path: engine.path().display().to_string(),
        pages,
    })
}

/// Execute info command
pub fn run_info(input: &Path, json: bool) -> Result<()> {
    let engine =
        engine::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let info = describe(engine.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    log!("info"; "{}: {}", info.path, plural_count(info.pages.len(), "page"));
    for page in &info.pages {
        println!("  {:>4}  {} x {}", page.page, page.width, page.height);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_describe_directory() {
        let dir = TempDir::new().unwrap();
        for (name, w) in [("a.svg", 10), ("b.svg", 20)] {
            std::fs::write(
                dir.path().join(name),
                format!(r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="5"/>"#),
            )
            .unwrap();
        }

        let engine = engine::open(dir.path()).unwrap();
        let info = describe(engine.as_ref()).unwrap();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["pages"][1]["page"], 2);
        assert_eq!(json["pages"][1]["width"], 20.0);
        assert_eq!(json["pages"][0]["height"], 5.0);
    }
}
