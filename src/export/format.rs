//! Output formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::InputError;

/// Raster format of one exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Webp,
    #[serde(alias = "jpeg")]
    Jpg,
    Ico,
}

impl ExportFormat {
    /// All formats, in the order files are written for each size.
    pub const ALL: [Self; 4] = [Self::Png, Self::Webp, Self::Jpg, Self::Ico];

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Jpg => "jpg",
            Self::Ico => "ico",
        }
    }

    /// Largest width or height the container can hold.
    pub const fn max_dimension(self) -> Option<u32> {
        match self {
            Self::Ico => Some(256),
            _ => None,
        }
    }

    pub fn fits(self, width: u32, height: u32) -> bool {
        self.max_dimension()
            .is_none_or(|max| width <= max && height <= max)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "ico" => Ok(Self::Ico),
            other => Err(InputError::UnknownFormat(other.to_string())),
        }
    }
}
