//! Paint value classification.

use svgtypes::Color;

/// Parse a CSS color literal into RGB channels. Alpha is ignored.
pub fn parse_color(value: &str) -> Option<[u8; 3]> {
    let color: Color = value.trim().parse().ok()?;
    Some([color.red, color.green, color.blue])
}

/// Whether `value` is a color with every channel at or above `threshold`.
pub fn is_near_white(value: &str, threshold: u8) -> bool {
    parse_color(value).is_some_and(|rgb| rgb.iter().all(|&c| c >= threshold))
}

/// Whether a paint value paints nothing (`none` or empty).
pub fn is_paint_none(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("none")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_hex() {
        assert_eq!(parse_color("white"), Some([255, 255, 255]));
        assert_eq!(parse_color("WHITE"), Some([255, 255, 255]));
        assert_eq!(parse_color("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_color("#FEFEFE"), Some([254, 254, 254]));
        assert_eq!(parse_color("#123"), Some([17, 34, 51]));
        assert_eq!(parse_color("red"), Some([255, 0, 0]));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#ggg"), None);
        assert_eq!(parse_color("url(#bg)"), None);
    }

    #[test]
    fn test_rgb_forms() {
        assert_eq!(parse_color("rgb(255, 251, 250)"), Some([255, 251, 250]));
        assert_eq!(parse_color("rgba(255,255,255,0.5)"), Some([255, 255, 255]));
        assert_eq!(parse_color("rgb(100%, 99%, 98%)"), Some([255, 252, 250]));
        assert_eq!(parse_color("rgb(1, 2)"), None);
    }

    #[test]
    fn test_near_white_threshold() {
        assert!(is_near_white("#fafafa", 250));
        assert!(!is_near_white("#f9f9f9", 250));
        assert!(!is_near_white("rgb(255, 255, 249)", 250));
        assert!(is_near_white("rgb(98%, 98%, 98%)", 250));
        assert!(!is_near_white("none", 250));
    }

    #[test]
    fn test_paint_none() {
        assert!(is_paint_none("none"));
        assert!(is_paint_none("  "));
        assert!(!is_paint_none("#000"));
    }
}
