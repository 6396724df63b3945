//! Full-canvas background detection and removal for extracted vector pages.
//!
//! Stripping runs an ordered list of strategies and keeps the first success:
//!
//! ```text
//! Structured ──parse error──► PatternDelete ──Err──► unchanged text
//! (neutralize in place)       (delete tags)           (terminal, never fails)
//! ```
//!
//! Structured neutralization keeps the node and only makes it transparent,
//! so sibling order and anything referencing the node stay intact. A
//! well-formed document is settled by the structured pass alone; the
//! pattern pass only reads tags out of text that doesn't parse, and holds
//! them to the same paint and coverage rules.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::bounds::{Bounds, geometry_bounds};
use super::color::{is_near_white, is_paint_none};
use super::document::{LooseTag, ShapeKind, SvgError, VectorDocument, parse_view_box};
use crate::debug;

/// Tuning for background detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripOptions {
    /// Minimum value of every RGB channel for a fill to count as white.
    pub white_threshold: u8,
    /// Minimum covered fraction of canvas width and of canvas height.
    pub min_coverage: f64,
    /// Origin tolerance as a fraction of the longer canvas side.
    pub tolerance_ratio: f64,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            white_threshold: 250,
            min_coverage: 0.95,
            tolerance_ratio: 0.02,
        }
    }
}

impl StripOptions {
    /// Origin tolerance in user units, at least 1.
    pub fn tolerance(&self, (w, h): (f64, f64)) -> f64 {
        (self.tolerance_ratio * w.max(h)).max(1.0)
    }
}

/// How a document was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripMethod {
    /// This many full-canvas shapes were made transparent.
    Neutralized(usize),
    /// A full-canvas shape was already neutralized; nothing to do.
    AlreadyStripped,
    /// This many full-canvas shape tags were deleted by pattern match.
    PatternDeleted(usize),
    /// No background found.
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct StripOutcome {
    pub text: String,
    pub method: StripMethod,
}

impl StripOutcome {
    fn unchanged(text: &str, method: StripMethod) -> Self {
        Self {
            text: text.to_string(),
            method,
        }
    }

    pub fn changed(&self) -> bool {
        matches!(
            self.method,
            StripMethod::Neutralized(_) | StripMethod::PatternDeleted(_)
        )
    }
}

#[derive(Debug, Error)]
enum StrategyError {
    #[error(transparent)]
    Parse(#[from] SvgError),
    #[error("no full-canvas near-white shape tag found")]
    NoMatch,
    #[error("no closing tag for <{0}>")]
    Unclosed(String),
}

#[derive(Debug, Clone, Copy)]
enum Strategy {
    Structured,
    PatternDelete,
}

impl Strategy {
    const ORDER: [Self; 2] = [Self::Structured, Self::PatternDelete];

    const fn name(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::PatternDelete => "pattern",
        }
    }

    fn apply(
        self,
        text: &str,
        canvas: (f64, f64),
        options: &StripOptions,
    ) -> Result<StripOutcome, StrategyError> {
        match self {
            Self::Structured => neutralize_background(text, canvas, options),
            Self::PatternDelete => delete_background_tags(text, canvas, options),
        }
    }
}

/// Remove an opaque full-canvas background from vector text.
///
/// Never fails: when no strategy applies the input comes back unchanged.
pub fn strip_background(text: &str, canvas: (f64, f64), options: &StripOptions) -> StripOutcome {
    for strategy in Strategy::ORDER {
        match strategy.apply(text, canvas, options) {
            Ok(outcome) => return outcome,
            Err(e) => debug!("strip"; "{} strategy skipped: {}", strategy.name(), e),
        }
    }

    StripOutcome::unchanged(text, StripMethod::Unchanged)
}

// ============================================================================
// Shape tests shared by both strategies
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paint {
    /// Near-white fill, no stroke.
    White,
    /// Already neutralized: `fill:none` and zero fill opacity, no stroke.
    Cleared,
    Other,
}

fn classify(attr: impl Fn(&str) -> Option<String>, threshold: u8) -> Paint {
    let style = attr("style").unwrap_or_default();

    let stroke = attr("stroke").or_else(|| style_get(&style, "stroke"));
    if stroke.is_some_and(|s| !is_paint_none(&s)) {
        return Paint::Other;
    }

    // A direct attribute wins over the style entry.
    let Some(fill) = attr("fill").or_else(|| style_get(&style, "fill")) else {
        return Paint::Other;
    };

    if is_near_white(&fill, threshold) {
        Paint::White
    } else if fill.trim().eq_ignore_ascii_case("none")
        && style_get(&style, "fill-opacity").is_some_and(|o| o.parse::<f64>() == Ok(0.0))
    {
        Paint::Cleared
    } else {
        Paint::Other
    }
}

fn fits_canvas(
    bounds: &Bounds,
    origin: (f64, f64),
    canvas: (f64, f64),
    options: &StripOptions,
) -> bool {
    let tol = options.tolerance(canvas);
    (bounds.min_x - origin.0).abs() <= tol
        && (bounds.min_y - origin.1).abs() <= tol
        && bounds.width() >= options.min_coverage * canvas.0
        && bounds.height() >= options.min_coverage * canvas.1
}

/// Paint of a shape, downgraded to [`Paint::Other`] unless it covers the canvas.
fn background_paint(
    kind: ShapeKind,
    attr: impl Fn(&str) -> Option<String>,
    origin: (f64, f64),
    canvas: (f64, f64),
    options: &StripOptions,
) -> Paint {
    let paint = classify(&attr, options.white_threshold);
    if paint == Paint::Other {
        return paint;
    }
    let fits = geometry_bounds(kind, &attr, canvas)
        .is_some_and(|b| fits_canvas(&b, origin, canvas, options));
    if fits { paint } else { Paint::Other }
}

// ============================================================================
// Structured strategy
// ============================================================================

fn neutralize_background(
    text: &str,
    canvas: (f64, f64),
    options: &StripOptions,
) -> Result<StripOutcome, StrategyError> {
    let mut doc = VectorDocument::parse(text)?;
    let origin = doc.canvas_origin();

    let mut targets = Vec::new();
    let mut already_stripped = false;
    for shape in doc.shapes() {
        let attr = |name: &str| shape.attr(name);
        match background_paint(shape.kind, attr, origin, canvas, options) {
            Paint::White => targets.push((shape.index(), shape.attr("style").unwrap_or_default())),
            Paint::Cleared => already_stripped = true,
            Paint::Other => {}
        }
    }

    if targets.is_empty() {
        let method = if already_stripped {
            StripMethod::AlreadyStripped
        } else {
            StripMethod::Unchanged
        };
        return Ok(StripOutcome::unchanged(text, method));
    }

    for (index, style) in &targets {
        let style = neutralized_style(style);
        doc.set_attrs(*index, &[("fill", Some("none")), ("style", Some(style.as_str()))]);
    }

    Ok(StripOutcome {
        text: doc.to_text()?,
        method: StripMethod::Neutralized(targets.len()),
    })
}

fn style_entries(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style
        .split(';')
        .filter_map(|entry| entry.split_once(':'))
        .map(|(k, v)| (k.trim(), v.trim()))
}

fn style_get(style: &str, key: &str) -> Option<String> {
    style_entries(style)
        .filter(|(k, _)| k.eq_ignore_ascii_case(key))
        .last()
        .map(|(_, v)| v.to_string())
}

/// Drop prior fill entries and force a transparent fill.
fn neutralized_style(style: &str) -> String {
    let mut kept: Vec<String> = style_entries(style)
        .filter(|(k, _)| !k.eq_ignore_ascii_case("fill") && !k.eq_ignore_ascii_case("fill-opacity"))
        .map(|(k, v)| format!("{k}:{v}"))
        .collect();
    kept.push("fill:none;fill-opacity:0".to_string());
    kept.join(";")
}

// ============================================================================
// Pattern strategy
// ============================================================================

static ROOT_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<svg\b[^>]*>").unwrap());

static SHAPE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(rect|polygon|path)\b[^>]*>").unwrap());

/// Delete every full-canvas near-white shape tag (with its element body, if
/// any) from text that doesn't parse as a document.
fn delete_background_tags(
    text: &str,
    canvas: (f64, f64),
    options: &StripOptions,
) -> Result<StripOutcome, StrategyError> {
    let origin = ROOT_TAG
        .find(text)
        .and_then(|m| LooseTag::parse(m.as_str()))
        .and_then(|root| parse_view_box(&root.attr("viewBox")?))
        .map_or((0.0, 0.0), |[x, y, _, _]| (x, y));

    let mut removed: Vec<Range<usize>> = Vec::new();
    for caps in SHAPE_TAG.captures_iter(text) {
        let (Some(tag), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if removed.last().is_some_and(|r| tag.start() < r.end) {
            continue;
        }
        let Some(shape) = LooseTag::parse(tag.as_str()) else {
            continue;
        };
        let Some(kind) = shape.shape_kind() else {
            continue;
        };
        let attr = |key: &str| shape.attr(key);
        if background_paint(kind, attr, origin, canvas, options) != Paint::White {
            continue;
        }

        let end = if tag.as_str().ends_with("/>") {
            tag.end()
        } else {
            let close = format!("</{}>", name.as_str());
            let at = text[tag.end()..]
                .find(&close)
                .ok_or_else(|| StrategyError::Unclosed(name.as_str().to_string()))?;
            tag.end() + at + close.len()
        };
        removed.push(tag.start()..end);
    }

    if removed.is_empty() {
        return Err(StrategyError::NoMatch);
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in &removed {
        out.push_str(&text[cursor..range.start]);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);

    Ok(StripOutcome {
        text: out,
        method: StripMethod::PatternDeleted(removed.len()),
    })
}
