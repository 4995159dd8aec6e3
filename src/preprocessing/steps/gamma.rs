use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};

/// Gamma applied to the ID photo after normalization
pub const GAMMA: f32 = 1.2;

/// Gamma correction with exponent 1/GAMMA: lifts mid-tones so the card's printed
/// background pattern fades while dark glyphs stay dark
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    Ok(DynamicImage::ImageLuma8(correct(&image.to_luma8(), GAMMA)))
}

fn correct(gray: &GrayImage, gamma: f32) -> GrayImage {
    let lut: Vec<u8> = (0..=255u32)
        .map(|v| ((v as f32 / 255.0).powf(1.0 / gamma) * 255.0).round() as u8)
        .collect();

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([lut[gray.get_pixel(x, y).0[0] as usize]])
    })
}
