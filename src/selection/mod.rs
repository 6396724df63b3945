//! Interactive rectangle selection.
//!
//! - [`aspect`]: presets, custom `W:H` parsing, constraint resolution
//! - [`builder`]: press/drag/release state machine
//!
//! The constraint is resolved fresh on every pointer event, so changing
//! the preset mid-drag takes effect on the next move.

mod aspect;
mod builder;

pub use aspect::{AspectConstraint, AspectError, AspectPreset, AspectSettings, parse_ratio};
pub use builder::SelectionBuilder;
