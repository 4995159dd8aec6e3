use crate::error::OcrError;
use image::DynamicImage;

/// Convert to 8-bit grayscale; already gray images pass through untouched
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    match image {
        DynamicImage::ImageLuma8(_) => Ok(image),
        other => Ok(DynamicImage::ImageLuma8(other.to_luma8())),
    }
}
