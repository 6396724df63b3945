use image::RgbaImage;
use rayon::prelude::*;

const PARALLEL_PIXEL_THRESHOLD: usize = 32 * 1024;

/// Per-pixel white mask: `1` where every RGB channel is at least `threshold`.
///
/// Channel masks are computed separately and combined with AND.
pub(super) fn build_white_mask(img: &RgbaImage, threshold: u8) -> Vec<u8> {
    let (width, height) = img.dimensions();
    let len = width as usize * height as usize;
    let mut mask = vec![0_u8; len];
    let raw = img.as_raw();

    if len >= PARALLEL_PIXEL_THRESHOLD {
        mask.par_iter_mut()
            .zip(raw.par_chunks_exact(4))
            .for_each(|(m, pixel)| *m = classify(pixel, threshold));
    } else {
        for (m, pixel) in mask.iter_mut().zip(raw.chunks_exact(4)) {
            *m = classify(pixel, threshold);
        }
    }

    mask
}

#[inline]
fn classify(pixel: &[u8], threshold: u8) -> u8 {
    let r = u8::from(pixel[0] >= threshold);
    let g = u8::from(pixel[1] >= threshold);
    let b = u8::from(pixel[2] >= threshold);
    r & g & b
}

/// Multiply the inverted mask into the alpha channel.
pub(super) fn apply_inverted_mask(img: &mut RgbaImage, mask: &[u8]) {
    let raw: &mut [u8] = img;
    if mask.len() >= PARALLEL_PIXEL_THRESHOLD {
        raw.par_chunks_exact_mut(4)
            .zip(mask.par_iter())
            .for_each(|(pixel, &m)| pixel[3] *= 1 - m);
    } else {
        for (pixel, &m) in raw.chunks_exact_mut(4).zip(mask.iter()) {
            pixel[3] *= 1 - m;
        }
    }
}
