//! Pixel normalization: contrast adjustment, oversize guard, thumbnails.
//!
//! All operations return a new image and leave the input untouched, so
//! the decoded pixels stay available for re-processing.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma, Rgb, RgbImage};

/// Apply a multiplicative contrast adjustment around the global mean:
/// `out = mean + (v - mean) * factor`, clamped to 0-255.
///
/// The mean is computed over the ITU-R BT.601 grayscale rendition and
/// used for every channel. The production factor is mild (1.2) so the
/// diagnostic signal survives the adjustment.
pub fn enhance_contrast(img: &DynamicImage, factor: f32) -> DynamicImage {
    let mean = grayscale_mean(img);

    match img {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = GrayImage::new(gray.width(), gray.height());
            for (x, y, p) in gray.enumerate_pixels() {
                out.put_pixel(x, y, Luma([stretch(p.0[0], mean, factor)]));
            }
            DynamicImage::ImageLuma8(out)
        }
        other => {
            let rgb = other.to_rgb8();
            let mut out = RgbImage::new(rgb.width(), rgb.height());
            for (x, y, p) in rgb.enumerate_pixels() {
                out.put_pixel(
                    x,
                    y,
                    Rgb([
                        stretch(p.0[0], mean, factor),
                        stretch(p.0[1], mean, factor),
                        stretch(p.0[2], mean, factor),
                    ]),
                );
            }
            DynamicImage::ImageRgb8(out)
        }
    }
}

/// Downscale only when either dimension exceeds `max_dim`, preserving
/// aspect ratio with a high-quality filter. Images within bounds come
/// back as an unmodified copy.
pub fn downscale_if_oversized(img: &DynamicImage, max_dim: u32) -> DynamicImage {
    if img.width() <= max_dim && img.height() <= max_dim {
        return img.clone();
    }
    img.resize(max_dim, max_dim, FilterType::Lanczos3)
}

/// Bounded-box thumbnail. Never upscales; the source is not mutated.
pub fn thumbnail(img: &DynamicImage, size: u32) -> DynamicImage {
    img.thumbnail(size, size)
}

fn grayscale_mean(img: &DynamicImage) -> f32 {
    let gray = img.to_luma8();
    let count = (gray.width() as u64) * (gray.height() as u64);
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    sum as f32 / count as f32
}

fn stretch(value: u8, mean: f32, factor: f32) -> u8 {
    (mean + (value as f32 - mean) * factor)
        .round()
        .clamp(0.0, 255.0) as u8
}
