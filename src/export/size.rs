//! Target size sets and long-edge fitting.

/// Parse a user-typed size list such as `"20, 40，80"`.
///
/// ASCII and full-width commas both separate entries. Entries that are not
/// positive integers are ignored.
pub fn parse_custom_sizes(input: &str) -> Vec<u32> {
    input
        .split([',', '，'])
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .filter(|&size| size > 0)
        .collect()
}

/// Merge size lists into one ascending set without zeros or duplicates.
pub fn normalize_sizes(sizes: impl IntoIterator<Item = u32>) -> Vec<u32> {
    let mut sizes: Vec<u32> = sizes.into_iter().filter(|&s| s > 0).collect();
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

/// Whole-pixel size of a source measured in document units.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn source_pixels((width, height): (f64, f64)) -> (u32, u32) {
    let px = |v: f64| if v.is_finite() && v > 0.0 { v as u32 } else { 0 };
    (px(width), px(height))
}

/// Scale `source` so its longer edge is `target`.
///
/// The shorter edge is rounded and never below 1. A degenerate source
/// yields a `target`x`target` square.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fit_long_edge((width, height): (u32, u32), target: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (target, target);
    }
    let short = |a: u32, b: u32| {
        ((f64::from(target) * f64::from(a) / f64::from(b)).round() as u32).max(1)
    };
    if width >= height {
        (target, short(height, width))
    } else {
        (short(width, height), target)
    }
}
