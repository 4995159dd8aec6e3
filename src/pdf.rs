//! PDF helpers shared by the certificate path
//!
//! Certificates arrive as PDFs often enough that the processor needs both the
//! embedded text layer and, for scanned PDFs, the embedded page images.

use crate::error::OcrError;
use image::DynamicImage;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Minimum amount of embedded text for a PDF to count as text-based
pub const MIN_EMBEDDED_TEXT_LEN: usize = 10;

/// Confidence reported for text read directly from a PDF text layer
pub const EMBEDDED_TEXT_CONFIDENCE: f32 = 0.95;

/// Check if a file is a PDF by extension or magic bytes
pub fn is_pdf(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        if ext.to_string_lossy().eq_ignore_ascii_case("pdf") {
            return true;
        }
    }

    let mut magic = [0u8; 5];
    match File::open(path) {
        Ok(mut file) => file.read_exact(&mut magic).is_ok() && &magic == b"%PDF-",
        Err(_) => false,
    }
}

/// Extract the embedded text layer of a PDF
pub fn extract_text(path: &Path) -> Result<String, OcrError> {
    let text = pdf_extract::extract_text(path)
        .map_err(|e| OcrError::ProcessingError(format!("Failed to parse PDF: {}", e)))?;
    Ok(text.trim().to_string())
}

/// Extract image XObjects from a PDF using lopdf
pub fn extract_images(path: &Path) -> Result<Vec<DynamicImage>, OcrError> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| OcrError::ProcessingError(format!("Failed to load PDF: {}", e)))?;

    let mut images = Vec::new();

    for (object_id, object) in doc.objects.iter() {
        let Ok(stream) = object.as_stream() else {
            continue;
        };
        let is_image = stream
            .dict
            .get(b"Subtype")
            .and_then(|subtype| subtype.as_name())
            .map(|name| name == b"Image")
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        match decode_image_stream(&doc, stream) {
            Ok(img) => images.push(img),
            Err(e) => {
                tracing::warn!("Failed to extract image from object {:?}: {}", object_id, e);
            }
        }
    }

    Ok(images)
}

fn decode_image_stream(
    doc: &lopdf::Document,
    stream: &lopdf::Stream,
) -> Result<DynamicImage, OcrError> {
    let dimension = |key: &[u8]| {
        stream
            .dict
            .get(key)
            .ok()
            .and_then(|v| v.as_i64().ok())
            .map(|v| v as u32)
            .ok_or_else(|| {
                OcrError::ProcessingError(format!(
                    "Missing image {}",
                    String::from_utf8_lossy(key).to_lowercase()
                ))
            })
    };
    let width = dimension(&b"Width"[..])?;
    let height = dimension(&b"Height"[..])?;

    // JPEG scans carry a complete JPEG file as the stream body
    let filters = filters(stream);
    if filters.iter().any(|f| f == "DCTDecode") {
        if filters.len() > 1 {
            return Err(OcrError::UnsupportedFormat(format!(
                "filter chain {}",
                filters.join(" ")
            )));
        }
        return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to decode JPEG image: {}", e)));
    }

    let data = stream
        .decompressed_content()
        .map_err(|e| OcrError::ProcessingError(format!("Failed to decompress image: {}", e)))?;

    let bits_per_component = stream
        .dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|b| b.as_i64().ok())
        .unwrap_or(8);
    if bits_per_component != 8 {
        return Err(OcrError::UnsupportedFormat(format!(
            "{} bits per component",
            bits_per_component
        )));
    }

    let pixels = (width as usize) * (height as usize);
    let color_space = color_space(doc, stream);

    tracing::debug!(
        "PDF image: {}x{}, color_space={}, data_len={}",
        width,
        height,
        color_space,
        data.len()
    );

    match color_space.as_str() {
        "DeviceGray" if data.len() >= pixels => {
            image::GrayImage::from_raw(width, height, data[..pixels].to_vec())
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| OcrError::ProcessingError("Invalid grayscale image data".into()))
        }
        "DeviceRGB" | "ICCBased" if data.len() >= pixels * 3 => {
            image::RgbImage::from_raw(width, height, data[..pixels * 3].to_vec())
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| OcrError::ProcessingError("Invalid RGB image data".into()))
        }
        "DeviceCMYK" if data.len() >= pixels * 4 => {
            let rgb: Vec<u8> = data[..pixels * 4]
                .chunks_exact(4)
                .flat_map(|px| {
                    let k = 1.0 - px[3] as f32 / 255.0;
                    [px[0], px[1], px[2]].map(|c| ((1.0 - c as f32 / 255.0) * k * 255.0) as u8)
                })
                .collect();
            image::RgbImage::from_raw(width, height, rgb)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| OcrError::ProcessingError("Invalid CMYK->RGB conversion".into()))
        }
        other => Err(OcrError::UnsupportedFormat(format!(
            "color space {} with {} bytes of data",
            other,
            data.len()
        ))),
    }
}

/// Filter names of a stream, in application order
fn filters(stream: &lopdf::Stream) -> Vec<String> {
    let Ok(filter) = stream.dict.get(b"Filter") else {
        return Vec::new();
    };

    match filter.as_array() {
        Ok(array) => array
            .iter()
            .filter_map(|f| f.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .collect(),
        Err(_) => filter
            .as_name()
            .map(|n| vec![String::from_utf8_lossy(n).to_string()])
            .unwrap_or_default(),
    }
}

/// Get the color space name from a PDF stream, resolving indirect references
fn color_space(doc: &lopdf::Document, stream: &lopdf::Stream) -> String {
    let Ok(obj) = stream.dict.get(b"ColorSpace") else {
        return "DeviceRGB".to_string();
    };

    let resolved = match obj.as_reference() {
        Ok(reference) => doc.get_object(reference).unwrap_or(obj),
        Err(_) => obj,
    };

    // Either a bare name or an array like [/ICCBased ref]
    let name = resolved.as_name().ok().or_else(|| {
        resolved
            .as_array()
            .ok()
            .and_then(|array| array.first())
            .and_then(|first| first.as_name().ok())
    });

    name.map(|n| String::from_utf8_lossy(n).to_string())
        .unwrap_or_else(|| "DeviceRGB".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use lopdf::dictionary;

    #[test]
    fn test_is_pdf_by_extension() {
        assert!(is_pdf(Path::new("/nonexistent/certificate.PDF")));
    }

    #[test]
    fn test_is_pdf_by_magic_bytes() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(b"%PDF-1.7\n").unwrap();
        assert!(is_pdf(file.path()));
    }

    fn image_stream(filter: lopdf::Object, content: Vec<u8>) -> lopdf::Stream {
        lopdf::Stream::new(
            lopdf::dictionary! {
                "Type" => lopdf::Object::Name(b"XObject".to_vec()),
                "Subtype" => lopdf::Object::Name(b"Image".to_vec()),
                "Width" => 32i64,
                "Height" => 16i64,
                "ColorSpace" => lopdf::Object::Name(b"DeviceGray".to_vec()),
                "BitsPerComponent" => 8i64,
                "Filter" => filter,
            },
            content,
        )
    }

    #[test]
    fn test_jpeg_encoded_scan_is_decoded() {
        let page = image::GrayImage::from_fn(32, 16, |x, _| image::Luma([(x * 8) as u8]));
        let mut jpeg = Vec::new();
        DynamicImage::ImageLuma8(page)
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let doc = lopdf::Document::with_version("1.5");
        let stream = image_stream(lopdf::Object::Name(b"DCTDecode".to_vec()), jpeg);

        let decoded = decode_image_stream(&doc, &stream).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }

    #[test]
    fn test_filter_array_is_read_in_order() {
        let chain = lopdf::Object::Array(vec![
            lopdf::Object::Name(b"FlateDecode".to_vec()),
            lopdf::Object::Name(b"DCTDecode".to_vec()),
        ]);
        let stream = image_stream(chain, Vec::new());
        assert_eq!(filters(&stream), vec!["FlateDecode", "DCTDecode"]);

        let doc = lopdf::Document::with_version("1.5");
        assert!(matches!(
            decode_image_stream(&doc, &stream),
            Err(OcrError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_jpeg_is_not_pdf() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();
        assert!(!is_pdf(file.path()));
    }
}
