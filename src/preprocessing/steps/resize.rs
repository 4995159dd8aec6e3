use crate::error::OcrError;
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Bounding box the ID photo is fitted into
pub const MAX_WIDTH: u32 = 1600;
pub const MAX_HEIGHT: u32 = 1200;

/// Scale the image to fit inside MAX_WIDTH x MAX_HEIGHT, preserving aspect ratio.
/// Small phone crops are scaled up as well; the recognizer does better on larger glyphs.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(OcrError::PreprocessingError("image has no pixels".to_string()));
    }

    // Already touching the box on one side and inside it on the other
    let fits = width <= MAX_WIDTH && height <= MAX_HEIGHT;
    if fits && (width == MAX_WIDTH || height == MAX_HEIGHT) {
        return Ok(image);
    }

    Ok(image.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn test_resize_upscales_small_image() {
        let img = GrayImage::new(100, 100);
        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(result.dimensions(), (1200, 1200));
    }

    #[test]
    fn test_resize_limits_wide_image_preserving_aspect() {
        let img = GrayImage::new(3200, 1200);
        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(result.dimensions(), (1600, 600));
    }

    #[test]
    fn test_resize_keeps_image_that_already_fits() {
        let img = GrayImage::new(1600, 900);
        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(result.dimensions(), (1600, 900));
    }

    #[test]
    fn test_resize_rejects_empty_image() {
        let img = GrayImage::new(0, 10);
        assert!(apply(DynamicImage::ImageLuma8(img)).is_err());
    }
}
