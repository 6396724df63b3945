//! Shared utilities.
//!
//! - [`exec`]: external command builder (stdin piping)
//! - [`path`]: path normalization and `~` expansion
//! - [`plural`]: count formatting for log messages

pub mod exec;
pub mod path;
pub mod plural;
