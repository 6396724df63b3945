//! `[strip]` section configuration.
//!
//! Tuning for background detection. These are heuristics, not invariants.
//!
//! # Example
//!
//! ```toml
//! [strip]
//! white_threshold = 250   # Minimum value of every RGB channel for "white"
//! coverage = 0.95         # Minimum fraction of canvas width and height
//! tolerance = 0.02        # Origin tolerance as a fraction of max(w, h)
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::image::svg::StripOptions;

const COVERAGE: FieldPath = FieldPath::new("strip.coverage");
const TOLERANCE: FieldPath = FieldPath::new("strip.tolerance");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// Channel floor (0-255) for a color to count as white.
    pub white_threshold: u8,

    /// Minimum covered fraction of canvas width and height.
    pub coverage: f64,

    /// Origin tolerance as a fraction of the longer canvas side (at least 1 unit).
    pub tolerance: f64,
}

impl Default for StripConfig {
    fn default() -> Self {
        let options = StripOptions::default();
        Self {
            white_threshold: options.white_threshold,
            coverage: options.min_coverage,
            tolerance: options.tolerance_ratio,
        }
    }
}

impl StripConfig {
    pub fn options(&self) -> StripOptions {
        StripOptions {
            white_threshold: self.white_threshold,
            min_coverage: self.coverage,
            tolerance_ratio: self.tolerance,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(self.coverage > 0.0 && self.coverage <= 1.0) {
            diag.error_with_hint(
                COVERAGE,
                format!("coverage must be in (0, 1], got {}", self.coverage),
                "the default is 0.95",
            );
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            diag.error(TOLERANCE, format!("tolerance must be >= 0, got {}", self.tolerance));
        }
    }
}
