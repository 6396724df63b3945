//! Configuration section definitions.
//!
//! Each module corresponds to a section in `pagecut.toml`:
//!
//! | Module   | TOML Section | Purpose                                    |
//! |----------|--------------|--------------------------------------------|
//! | `view`   | `[view]`     | Render zoom, fit viewport, single-PNG DPI  |
//! | `export` | `[export]`   | Batch sizes, formats, rasterizer           |
//! | `strip`  | `[strip]`    | Background-detection tuning                |

mod export;
mod strip;
mod view;

pub use export::{ExportConfig, RasterizerChoice};
pub use strip::StripConfig;
pub use view::ViewConfig;
