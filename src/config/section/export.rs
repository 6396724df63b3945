//! `[export]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [export]
//! sizes = [16, 32, 64, 128, 256, 512]   # Long-edge sizes in pixels
//! formats = ["png", "webp", "jpg", "ico"]
//! jpeg_quality = 95
//! rasterizer = "builtin"   # Vector rasterizer: builtin | magick | none
//! remove_background = false
//! ```
//!
//! # Behavior
//!
//! - `rasterizer = "builtin"` -> render vector text with resvg
//! - `rasterizer = "magick"` -> pipe vector text through ImageMagick
//! - `rasterizer = "none"` -> always re-render the page region instead

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::export::ExportFormat;

const SIZES: FieldPath = FieldPath::new("export.sizes");
const FORMATS: FieldPath = FieldPath::new("export.formats");
const JPEG_QUALITY: FieldPath = FieldPath::new("export.jpeg_quality");
const RASTERIZER: FieldPath = FieldPath::new("export.rasterizer");

/// Default long-edge sizes, including small icon sizes.
pub const DEFAULT_SIZES: [u32; 10] = [16, 24, 32, 48, 64, 96, 128, 256, 512, 1024];

/// Vector rasterizer backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RasterizerChoice {
    /// Use resvg.
    #[default]
    Builtin,
    /// Use ImageMagick (`magick` command).
    Magick,
    /// No vector rasterizer; always use the page fallback.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Long-edge target sizes in pixels.
    pub sizes: Vec<u32>,

    /// Output formats.
    pub formats: Vec<ExportFormat>,

    /// JPEG quality (1-100).
    pub jpeg_quality: u8,

    /// Vector rasterizer backend.
    pub rasterizer: RasterizerChoice,

    /// Make near-white pixels transparent and neutralize vector backgrounds.
    pub remove_background: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            formats: ExportFormat::ALL.to_vec(),
            jpeg_quality: 95,
            rasterizer: RasterizerChoice::Builtin,
            remove_background: false,
        }
    }
}

impl ExportConfig {
    /// Validate export configuration.
    ///
    /// A missing `magick` binary is only a hint: the export falls back to
    /// page rendering.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.sizes.is_empty() {
            diag.error(SIZES, "at least one size is required");
        }
        if self.sizes.contains(&0) {
            diag.error(SIZES, "sizes must be positive");
        }
        if self.formats.is_empty() {
            diag.error_with_hint(
                FORMATS,
                "at least one format is required",
                "formats = [\"png\"]",
            );
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            diag.error(
                JPEG_QUALITY,
                format!("jpeg_quality must be 1-100, got {}", self.jpeg_quality),
            );
        }
        if self.rasterizer == RasterizerChoice::Magick && which::which("magick").is_err() {
            diag.hint(
                RASTERIZER,
                "`magick` command not found, exports will re-render the page instead",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.export.sizes, DEFAULT_SIZES.to_vec());
        assert_eq!(config.export.formats, ExportFormat::ALL.to_vec());
        assert_eq!(config.export.jpeg_quality, 95);
        assert_eq!(config.export.rasterizer, RasterizerChoice::Builtin);
        assert!(!config.export.remove_background);
    }

    #[test]
    fn test_rasterizer_parsing() {
        let cases = [
            ("builtin", RasterizerChoice::Builtin),
            ("magick", RasterizerChoice::Magick),
            ("none", RasterizerChoice::None),
        ];
        for (input, expected) in cases {
            let config = test_parse_config(&format!("[export]\nrasterizer = \"{input}\""));
            assert_eq!(config.export.rasterizer, expected, "failed for {input}");
        }
    }

    #[test]
    fn test_formats_parsing() {
        let config = test_parse_config("[export]\nformats = [\"png\", \"jpeg\"]");
        assert_eq!(
            config.export.formats,
            vec![ExportFormat::Png, ExportFormat::Jpg]
        );
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = test_parse_config("[export]\nsizes = []\nformats = []\njpeg_quality = 0");
        let mut diag = ConfigDiagnostics::new();
        config.export.validate(&mut diag);
        assert_eq!(diag.len(), 3);
    }
}
