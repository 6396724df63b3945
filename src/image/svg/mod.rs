//! Vector graphic processing.
//!
//! # Modules
//!
//! - [`document`]: owned, editable SVG event tree
//! - [`color`]: fill/stroke paint classification
//! - [`bounds`]: shape bounding boxes (rect, polygon, path)
//! - [`strip`]: full-canvas background removal
//! - [`render`]: vector rasterizers (builtin / magick)
//!
//! # Architecture
//!
//! ```text
//! extracted vector text
//!         │
//!         ▼
//!    ┌──────────┐
//!    │  strip   │ ──► document + color + bounds
//!    └────┬─────┘
//!         │
//!         ▼
//!    ┌──────────┐
//!    │  render  │ ──► RGBA pixels at the requested size
//!    └──────────┘
//! ```

mod bounds;
mod color;
mod document;
mod render;
mod strip;

pub use document::{SvgError, VectorDocument};
pub use render::{RasterizeError, VectorRasterizer, load_options, render_tree};
pub use strip::{StripMethod, StripOptions, StripOutcome, strip_background};
