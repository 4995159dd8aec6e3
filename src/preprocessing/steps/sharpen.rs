use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Gaussian sigma of the unsharp mask
const SIGMA: f32 = 1.5;
/// Weight of the high-frequency detail added back
const AMOUNT: f32 = 1.0;

/// Unsharp masking: add back the difference between the image and its blur,
/// making glyph edges crisper before binarization
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    let blurred = gaussian_blur_f32(&gray, SIGMA);

    let sharpened = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let original = gray.get_pixel(x, y).0[0] as f32;
        let detail = original - blurred.get_pixel(x, y).0[0] as f32;
        Luma([(original + AMOUNT * detail).round().clamp(0.0, 255.0) as u8])
    });

    Ok(DynamicImage::ImageLuma8(sharpened))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharpen_enhances_edges() {
        // Left half dark, right half light
        let img = GrayImage::from_fn(20, 10, |x, _| if x < 10 { Luma([50]) } else { Luma([200]) });

        let result = apply(DynamicImage::ImageLuma8(img)).unwrap().to_luma8();

        let edge_left = result.get_pixel(9, 5).0[0] as i32;
        let edge_right = result.get_pixel(10, 5).0[0] as i32;
        let original_diff = 200 - 50;

        assert!(
            edge_right - edge_left >= original_diff,
            "Edge should be enhanced: {} >= {}",
            edge_right - edge_left,
            original_diff
        );
    }

    #[test]
    fn test_sharpen_leaves_flat_regions() {
        let img = GrayImage::from_pixel(10, 10, Luma([90]));
        let result = apply(DynamicImage::ImageLuma8(img)).unwrap().to_luma8();
        let value = result.get_pixel(5, 5).0[0] as i32;
        assert!((value - 90).abs() <= 1, "Expected ~90, got {}", value);
    }
}
