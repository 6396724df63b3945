//! Aspect-ratio presets, custom ratio parsing and resolution.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Malformed aspect-ratio input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AspectError {
    #[error("aspect ratio `{0}` is not `W:H` or a single number")]
    Malformed(String),
    #[error("aspect ratio `{0}` must be positive")]
    NonPositive(String),
    #[error("unknown aspect preset `{0}` (expected free, 1:1, 4:3, 3:2, 16:9 or 9:16)")]
    UnknownPreset(String),
}

/// Named aspect presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AspectPreset {
    #[default]
    Free,
    Square,
    Standard,
    Photo,
    Wide,
    Tall,
}

impl AspectPreset {
    pub const ALL: [Self; 6] = [
        Self::Free,
        Self::Square,
        Self::Standard,
        Self::Photo,
        Self::Wide,
        Self::Tall,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Square => "1:1",
            Self::Standard => "4:3",
            Self::Photo => "3:2",
            Self::Wide => "16:9",
            Self::Tall => "9:16",
        }
    }

    /// Width / height, or `None` for free selection.
    pub fn ratio(self) -> Option<f64> {
        match self {
            Self::Free => None,
            Self::Square => Some(1.0),
            Self::Standard => Some(4.0 / 3.0),
            Self::Photo => Some(3.0 / 2.0),
            Self::Wide => Some(16.0 / 9.0),
            Self::Tall => Some(9.0 / 16.0),
        }
    }

    /// Lenient lookup: unknown names resolve to [`AspectPreset::Free`].
    pub fn lookup(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for AspectPreset {
    type Err = AspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AspectError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Active constraint on the selection rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum AspectConstraint {
    #[default]
    Free,
    /// Positive width / height.
    Ratio(f64),
}

impl AspectConstraint {
    pub fn ratio(self) -> Option<f64> {
        match self {
            Self::Free => None,
            Self::Ratio(r) => Some(r),
        }
    }
}

/// Parse a custom ratio: `"W:H"` with both sides positive, or one positive number.
pub fn parse_ratio(input: &str) -> Result<f64, AspectError> {
    let s = input.trim();
    let ratio = match s.split_once(':') {
        Some((w, h)) => {
            let w = parse_positive(w, s)?;
            let h = parse_positive(h, s)?;
            w / h
        }
        None => parse_positive(s, s)?,
    };
    Ok(ratio)
}

fn parse_positive(part: &str, whole: &str) -> Result<f64, AspectError> {
    let v: f64 = part
        .trim()
        .parse()
        .map_err(|_| AspectError::Malformed(whole.to_string()))?;
    if !v.is_finite() {
        return Err(AspectError::Malformed(whole.to_string()));
    }
    if v <= 0.0 {
        return Err(AspectError::NonPositive(whole.to_string()));
    }
    Ok(v)
}

/// User-facing aspect options: a preset plus an optional custom string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AspectSettings {
    pub preset: AspectPreset,
    pub custom: Option<String>,
}

impl AspectSettings {
    pub fn new(preset: AspectPreset, custom: Option<String>) -> Self {
        Self { preset, custom }
    }

    /// Resolve the constraint: custom string (if it parses) > preset > free.
    ///
    /// A custom string that fails to parse is ignored.
    pub fn constraint(&self) -> AspectConstraint {
        let custom = self
            .custom
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| parse_ratio(s).ok());

        match custom.or_else(|| self.preset.ratio()) {
            Some(r) => AspectConstraint::Ratio(r),
            None => AspectConstraint::Free,
        }
    }
}
