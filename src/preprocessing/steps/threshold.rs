use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};

/// Fixed binarization threshold; pixels at or above it become white
pub const THRESHOLD: u8 = 128;

/// Binarize with a fixed global threshold. The ID photo has already been
/// normalized, so a global cut is stable across lighting conditions.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    Ok(DynamicImage::ImageLuma8(binarize(&image.to_luma8(), THRESHOLD)))
}

fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] >= threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_binarizes_image() {
        let img = GrayImage::from_fn(50, 50, |x, _| Luma([(x * 5) as u8]));

        let result = apply(DynamicImage::ImageLuma8(img)).unwrap().to_luma8();

        for pixel in result.pixels() {
            assert!(
                pixel.0[0] == 0 || pixel.0[0] == 255,
                "Expected binary pixel, got {}",
                pixel.0[0]
            );
        }
    }

    #[test]
    fn test_threshold_boundary_is_white() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([THRESHOLD - 1]));
        img.put_pixel(1, 0, Luma([THRESHOLD]));

        let result = binarize(&img, THRESHOLD);

        assert_eq!(result.get_pixel(0, 0).0[0], 0);
        assert_eq!(result.get_pixel(1, 0).0[0], 255);
    }
}
