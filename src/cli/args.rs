//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::export::{ExportFormat, InputError};

/// Cut page regions out of vector documents and export them as images
#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: pagecut.toml)
    #[arg(short = 'C', long, global = true, default_value = "pagecut.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show page count and page sizes
    #[command(visible_alias = "i")]
    Info {
        /// SVG file, or a directory of SVG pages
        #[arg(value_hint = clap::ValueHint::AnyPath)]
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Extract the selected region as an SVG file
    Svg {
        #[arg(value_hint = clap::ValueHint::AnyPath)]
        input: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Output file (default: `{input stem}.svg` in the current directory)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Neutralize a full-page white background
        #[arg(long)]
        nobg: bool,
    },

    /// Rasterize the selected region to a PNG file
    Png {
        #[arg(value_hint = clap::ValueHint::AnyPath)]
        input: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Output file (default: `{input stem}.png` in the current directory)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Resolution in dots per inch (72 = one pixel per unit)
        #[arg(long)]
        dpi: Option<u32>,

        /// Make near-white pixels transparent
        #[arg(long)]
        nobg: bool,
    },

    /// Batch export the selected region at several sizes and formats
    #[command(visible_alias = "e")]
    Export {
        #[arg(value_hint = clap::ValueHint::AnyPath)]
        input: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        #[command(flatten)]
        args: ExportArgs,
    },

    /// Remove a full-canvas white background from an SVG file
    Strip {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,

        /// Canvas size WxH (default: the file's own size)
        #[arg(long, value_parser = parse_dims)]
        size: Option<(u32, u32)>,

        /// Output file (default: print to stdout)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

/// Region selection shared by the `svg`, `png` and `export` commands.
///
/// Points are canvas pixels of the page fitted into `--viewport`.
#[derive(clap::Args, Debug, Clone)]
pub struct SelectArgs {
    /// Page number (1-based)
    #[arg(short, long, default_value = "1", value_parser = parse_page)]
    pub page: usize,

    /// Where the drag starts, as X,Y
    #[arg(long, value_parser = parse_point, requires = "to", allow_hyphen_values = true)]
    pub from: Option<(f64, f64)>,

    /// Intermediate drag position, as X,Y (repeatable)
    #[arg(long, value_parser = parse_point, requires = "to", allow_hyphen_values = true)]
    pub drag: Vec<(f64, f64)>,

    /// Where the drag is released, as X,Y
    #[arg(long, value_parser = parse_point, requires = "from", allow_hyphen_values = true)]
    pub to: Option<(f64, f64)>,

    /// Canvas size WxH the page is fitted into
    #[arg(long, value_parser = parse_dims)]
    pub viewport: Option<(u32, u32)>,

    /// Page render zoom
    #[arg(short, long)]
    pub zoom: Option<f64>,

    /// Aspect preset: free, 1:1, 4:3, 3:2, 16:9, 9:16
    #[arg(short, long)]
    pub aspect: Option<String>,

    /// Custom aspect ratio, as W:H or a single number (overrides --aspect)
    #[arg(short, long)]
    pub ratio: Option<String>,
}

/// Batch export arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// Output directory
    #[arg(short = 'd', long = "dir", value_hint = clap::ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Base file name (default: input stem)
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Long-edge sizes in pixels (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub sizes: Option<Vec<u32>>,

    /// Extra sizes; ASCII or full-width commas, bad entries are ignored
    #[arg(long)]
    pub custom_sizes: Option<String>,

    /// Output formats: png, webp, jpg, ico (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub formats: Option<Vec<ExportFormat>>,

    /// Remove white backgrounds (vector and raster)
    #[arg(long)]
    pub nobg: bool,

    /// Also write the extracted `{name}.svg`
    #[arg(long)]
    pub vector: bool,
}

/// `1`, `2`, ... as a page number.
fn parse_page(s: &str) -> Result<usize, InputError> {
    s.trim()
        .parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| malformed("page number", s))
}

/// `X,Y` as a point.
pub fn parse_point(s: &str) -> Result<(f64, f64), InputError> {
    let (x, y) = s.split_once(',').ok_or_else(|| malformed("point", s))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| malformed("point", s))
    };
    Ok((coord(x)?, coord(y)?))
}

/// `WxH` as a pixel size.
pub fn parse_dims(s: &str) -> Result<(u32, u32), InputError> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| malformed("size", s))?;
    let dim = |v: &str| {
        v.trim()
            .parse::<u32>()
            .ok()
            .filter(|&v| v > 0)
            .ok_or_else(|| malformed("size", s))
    };
    Ok((dim(w)?, dim(h)?))
}

fn malformed(what: &'static str, value: &str) -> InputError {
    InputError::Malformed {
        what,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("100,50.5").unwrap(), (100.0, 50.5));
        assert_eq!(parse_point(" -3 , 4 ").unwrap(), (-3.0, 4.0));
        assert!(parse_point("100").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_parse_dims() {
        assert_eq!(parse_dims("1200x800").unwrap(), (1200, 800));
        assert_eq!(parse_dims("64X32").unwrap(), (64, 32));
        assert!(parse_dims("0x10").is_err());
        assert!(parse_dims("10").is_err());
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page("3").unwrap(), 3);
        assert!(parse_page("0").is_err());
    }

    #[test]
    fn test_export_command() {
        let cli = Cli::parse_from([
            "pagecut", "export", "doc", "--page", "2", "--from", "100,100", "--to", "500,160",
            "--aspect", "16:9", "-d", "out", "--formats", "png,jpeg", "--custom-sizes", "20，40",
            "-V",
        ]);
        assert!(cli.verbose);
        let Commands::Export { select, args, .. } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(select.page, 2);
        assert_eq!(select.from, Some((100.0, 100.0)));
        assert_eq!(select.to, Some((500.0, 160.0)));
        assert_eq!(select.aspect.as_deref(), Some("16:9"));
        assert_eq!(args.dir, Some(PathBuf::from("out")));
        assert_eq!(args.formats, Some(vec![ExportFormat::Png, ExportFormat::Jpg]));
        assert_eq!(args.custom_sizes.as_deref(), Some("20，40"));
    }

    #[test]
    fn test_from_requires_to() {
        let result = Cli::try_parse_from(["pagecut", "svg", "doc", "--from", "1,1"]);
        assert!(result.is_err());
    }
}
