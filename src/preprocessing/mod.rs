//! Image preprocessing for ID document photos
//!
//! Normalizes a raw photograph into a clean, binarized PNG before recognition.
//! Preprocessing degrades gracefully: any failure hands back the original path so
//! recognition is still attempted on the unprocessed photo.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, PreprocessingResult, StepTiming};

use crate::error::OcrError;
use crate::pdf;
use std::path::{Path, PathBuf};

/// Preprocess the ID photo at `image_path` and write the result beside it as
/// `<stem>_processed.png`.
///
/// Returns `None` for PDFs (the caller must fall back to PDF text extraction),
/// the processed path on success, and the original path if processing failed.
/// The caller owns cleanup of both files.
pub fn preprocess(image_path: &Path) -> Option<PathBuf> {
    if pdf::is_pdf(image_path) {
        tracing::info!("PDF detected, OCR cannot process {:?} directly", image_path);
        return None;
    }

    match run(image_path) {
        Ok(output) => Some(output),
        Err(e) => {
            tracing::warn!(
                "Preprocessing {:?} failed, using original image: {}",
                image_path,
                e
            );
            Some(image_path.to_path_buf())
        }
    }
}

/// Path the processed image for `image_path` is written to
pub fn processed_path(image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    image_path.with_file_name(format!("{}_processed.png", stem))
}

fn run(image_path: &Path) -> Result<PathBuf, OcrError> {
    let image = image::open(image_path)
        .map_err(|e| OcrError::PreprocessingError(format!("Failed to load image: {}", e)))?;

    let result = Pipeline::id_document().process(image)?;

    let output = processed_path(image_path);
    result
        .image
        .save_with_format(&output, image::ImageFormat::Png)
        .map_err(|e| OcrError::PreprocessingError(format!("Failed to write {:?}: {}", output, e)))?;

    tracing::info!(
        "Preprocessed {:?} in {}ms ({} steps)",
        image_path,
        result.total_time_ms,
        result.steps.len()
    );

    Ok(output)
}
