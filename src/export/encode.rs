//! Per-format encoders.

use std::io::Cursor;

use image::codecs::ico::IcoEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{
    DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageResult, RgbImage, RgbaImage,
};

use super::ExportFormat;

/// Encode `img` as `format`.
///
/// PNG and WebP try a lossless, best-compression encoder first and fall back
/// to the default encoder. JPEG is flattened onto white.
pub fn encode(img: &RgbaImage, format: ExportFormat, jpeg_quality: u8) -> ImageResult<Vec<u8>> {
    match format {
        ExportFormat::Png => encode_png(img).or_else(|_| encode_default(img, ImageFormat::Png)),
        ExportFormat::Webp => encode_webp(img).or_else(|_| encode_default(img, ImageFormat::WebP)),
        ExportFormat::Jpg => encode_jpeg(&flatten_on_white(img), jpeg_quality),
        ExportFormat::Ico => encode_ico(img),
    }
}

fn encode_png(img: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)?;
    Ok(buf)
}

fn encode_webp(img: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    WebPEncoder::new_lossless(&mut buf)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)?;
    Ok(buf)
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)?;
    Ok(buf)
}

fn encode_ico(img: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    IcoEncoder::new(&mut buf)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)?;
    Ok(buf)
}

fn encode_default(img: &RgbaImage, format: ImageFormat) -> ImageResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img.clone()).write_to(&mut buf, format)?;
    Ok(buf.into_inner())
}

/// Composite over an opaque white background.
#[allow(clippy::cast_possible_truncation)]
pub fn flatten_on_white(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        let a = u32::from(a);
        let over = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([over(r), over(g), over(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(8, 4, Rgba([0, 0, 255, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        img
    }

    #[test]
    fn test_flatten_on_white() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        img.put_pixel(2, 0, Rgba([0, 0, 0, 128]));
        let flat = flatten_on_white(&img);
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(1, 0).0, [10, 20, 30]);
        assert_eq!(flat.get_pixel(2, 0).0, [127, 127, 127]);
    }

    #[test]
    fn test_lossless_formats_keep_pixels() {
        let img = sample();
        for (format, image_format) in [
            (ExportFormat::Png, ImageFormat::Png),
            (ExportFormat::Webp, ImageFormat::WebP),
            (ExportFormat::Ico, ImageFormat::Ico),
        ] {
            let bytes = encode(&img, format, 95).unwrap();
            let decoded = image::load_from_memory_with_format(&bytes, image_format)
                .unwrap()
                .to_rgba8();
            assert_eq!(decoded.dimensions(), (8, 4), "{format}");
            assert_eq!(decoded.get_pixel(3, 2), img.get_pixel(3, 2), "{format}");
            assert_eq!(decoded.get_pixel(0, 0)[3], 0, "{format}");
        }
    }

    #[test]
    fn test_jpeg_is_opaque() {
        let bytes = encode(&RgbaImage::new(8, 8), ExportFormat::Jpg, 95).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        let corner = decoded.to_rgb8().get_pixel(0, 0).0;
        assert!(corner.iter().all(|&c| c > 250), "{corner:?}");
    }
}
