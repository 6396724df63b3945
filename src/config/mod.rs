//! Tool configuration from `pagecut.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── export     # [export]
//! │   ├── strip      # [strip]
//! │   └── view       # [view]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # AppConfig (this file)
//! ```
//!
//! The file is optional: when none is found every section uses its defaults.
//! Command-line flags override values read from the file.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{ExportConfig, RasterizerChoice, StripConfig, ViewConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands, ExportArgs, SelectArgs},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing `pagecut.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path of the loaded config file, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Page view settings
    #[serde(default)]
    pub view: ViewConfig,

    /// Batch export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Background stripping heuristics
    #[serde(default)]
    pub strip: StripConfig,
}

impl AppConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file, applies command-line
    /// overrides, then validates the result.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_name = crate::utils::path::expand_tilde(&cli.config);

        let mut config = match find_config_file(&config_name, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(crate::utils::path::normalize_path(&path));
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    pub(crate) fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Info { .. } | Commands::Strip { .. } => {}
            Commands::Svg { select, .. } => self.apply_select_args(select),
            Commands::Png { select, dpi, .. } => {
                self.apply_select_args(select);
                Self::update_option(&mut self.view.dpi, dpi.as_ref());
            }
            Commands::Export { select, args, .. } => {
                self.apply_select_args(select);
                self.apply_export_args(args);
            }
        }
    }

    fn apply_select_args(&mut self, args: &SelectArgs) {
        Self::update_option(&mut self.view.zoom, args.zoom.as_ref());
        if let Some((w, h)) = args.viewport {
            self.view.viewport = [w, h];
        }
    }

    fn apply_export_args(&mut self, args: &ExportArgs) {
        Self::update_option(&mut self.export.sizes, args.sizes.as_ref());
        Self::update_option(&mut self.export.formats, args.formats.as_ref());
        if args.nobg {
            self.export.remove_background = true;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate all sections.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.view.validate(&mut diag);
        self.export.validate(&mut diag);
        self.strip.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config text.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AppConfig {
    let (parsed, ignored) = AppConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
