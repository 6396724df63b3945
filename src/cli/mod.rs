//! Command-line interface module.

mod args;
pub mod common;
pub mod export;
pub mod extract;
pub mod info;
pub mod strip;

pub use args::{Cli, Commands, ExportArgs, SelectArgs};
