//! `[view]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [view]
//! zoom = 2.0              # Page render zoom (multiplier over 72 units per inch)
//! viewport = [1200, 800]  # Canvas size the rendered page is fitted into
//! dpi = 300               # Resolution for the `png` command
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

const ZOOM: FieldPath = FieldPath::new("view.zoom");
const VIEWPORT: FieldPath = FieldPath::new("view.viewport");
const DPI: FieldPath = FieldPath::new("view.dpi");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Render zoom applied on top of the 72-units-per-inch base resolution.
    pub zoom: f64,

    /// Canvas size `[width, height]` in pixels.
    pub viewport: [u32; 2],

    /// DPI for single PNG export.
    pub dpi: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            zoom: 2.0,
            viewport: [1200, 800],
            dpi: 300,
        }
    }
}

impl ViewConfig {
    pub fn viewport(&self) -> (u32, u32) {
        (self.viewport[0], self.viewport[1])
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            diag.error(ZOOM, format!("zoom must be positive, got {}", self.zoom));
        }
        if self.viewport.contains(&0) {
            diag.error_with_hint(
                VIEWPORT,
                "viewport dimensions must be non-zero",
                "e.g. viewport = [1200, 800]",
            );
        }
        if self.dpi == 0 {
            diag.error(DPI, "dpi must be positive");
        }
    }
}
