use image::RgbaImage;

use crate::image::background::mask::{apply_inverted_mask, build_white_mask};

/// Channel floor for "near white".
pub const DEFAULT_WHITE_THRESHOLD: u8 = 250;

/// Make near-white pixels fully transparent in place.
///
/// Alpha of every other pixel is left as it was.
pub fn remove_white_background(img: &mut RgbaImage, threshold: u8) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let mask = build_white_mask(img, threshold);
    apply_inverted_mask(img, &mask);
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    #[test]
    fn test_removes_white_pixels() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        remove_white_background(&mut img, DEFAULT_WHITE_THRESHOLD);
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_keeps_colored_pixel_alpha() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 0, Rgba([200, 10, 10, 128]));
        img.put_pixel(2, 0, Rgba([251, 251, 240, 77]));

        remove_white_background(&mut img, DEFAULT_WHITE_THRESHOLD);

        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(1, 0)[3], 128);
        assert_eq!(img.get_pixel(2, 0)[3], 77);
    }

    #[test]
    fn test_respects_custom_threshold() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([240, 240, 240, 255]));
        remove_white_background(&mut img, DEFAULT_WHITE_THRESHOLD);
        assert_eq!(img.get_pixel(0, 0)[3], 255);

        remove_white_background(&mut img, 235);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_handles_empty_image() {
        let mut img = RgbaImage::new(0, 0);
        remove_white_background(&mut img, DEFAULT_WHITE_THRESHOLD);
        assert_eq!(img.dimensions(), (0, 0));
    }
}
