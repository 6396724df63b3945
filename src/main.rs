//! pagecut - cut page regions out of vector documents and export them.

#![allow(dead_code)]

mod cli;
mod config;
mod engine;
mod export;
mod geometry;
mod image;
mod logger;
mod selection;
mod session;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = AppConfig::load(&cli)?;

    match &cli.command {
        Commands::Info { input, json } => cli::info::run_info(input, *json),
        Commands::Svg {
            input,
            select,
            output,
            nobg,
        } => cli::extract::run_svg(input, select, output.as_deref(), *nobg, &config),
        Commands::Png {
            input,
            select,
            output,
            nobg,
            ..
        } => cli::extract::run_png(input, select, output.as_deref(), *nobg, &config),
        Commands::Export {
            input,
            select,
            args,
        } => cli::export::run_export(input, select, args, &config),
        Commands::Strip {
            input,
            size,
            output,
        } => cli::strip::run_strip(input, *size, output.as_deref(), &config),
    }
}
