//! Make near-white raster pixels transparent.
//!
//! Each pixel whose red, green and blue channels all reach the threshold is
//! part of the white mask; the inverted mask is multiplied into alpha.

mod mask;
mod process;

pub use process::{DEFAULT_WHITE_THRESHOLD, remove_white_background};
