//! Image processing.
//!
//! - [`svg`]: vector document model, background stripping, rasterizers
//! - [`background`]: raster near-white removal

pub mod background;
pub mod svg;
