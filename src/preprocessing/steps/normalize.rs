use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};

/// Share of darkest/brightest pixels ignored when picking the stretch range
const CLIP_FRACTION: f32 = 0.01;

/// Normalize contrast by stretching the 1st..99th percentile range to 0-255.
/// Clipping the tails keeps a few specular highlights or dust specks on a
/// laminated card from pinning the range.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    let (low, high) = percentile_range(&gray, CLIP_FRACTION);

    if high <= low {
        return Ok(DynamicImage::ImageLuma8(gray));
    }

    let range = (high - low) as f32;
    let normalized = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y).0[0].clamp(low, high);
        Luma([((pixel - low) as f32 / range * 255.0).round() as u8])
    });

    Ok(DynamicImage::ImageLuma8(normalized))
}

fn percentile_range(img: &GrayImage, clip: f32) -> (u8, u8) {
    let mut histogram = [0u64; 256];
    for pixel in img.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    let cutoff = (total as f32 * clip).floor() as u64;

    let mut seen = 0u64;
    let low = histogram
        .iter()
        .position(|&count| {
            seen += count;
            seen > cutoff
        })
        .unwrap_or(0) as u8;

    let mut seen = 0u64;
    let high = histogram
        .iter()
        .rposition(|&count| {
            seen += count;
            seen > cutoff
        })
        .unwrap_or(255) as u8;

    (low, high)
}
