use crate::error::OcrError;
use image::DynamicImage;
use imageproc::filter::median_filter;

/// 3x3 median filter: removes the salt-and-pepper specks binarization leaves
/// behind while keeping glyph edges
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    Ok(DynamicImage::ImageLuma8(median_filter(&gray, 1, 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_denoise_removes_isolated_specks() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([255]));
        img.put_pixel(5, 5, Luma([0]));
        img.put_pixel(2, 7, Luma([0]));

        let result = apply(DynamicImage::ImageLuma8(img)).unwrap().to_luma8();

        assert_eq!(result.get_pixel(5, 5).0[0], 255);
        assert_eq!(result.get_pixel(2, 7).0[0], 255);
    }

    #[test]
    fn test_denoise_keeps_solid_strokes() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([255]));
        for x in 0..10 {
            for y in 4..7 {
                img.put_pixel(x, y, Luma([0]));
            }
        }

        let result = apply(DynamicImage::ImageLuma8(img)).unwrap().to_luma8();

        assert_eq!(result.get_pixel(5, 5).0[0], 0);
    }
}
