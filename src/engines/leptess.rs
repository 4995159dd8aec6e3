//! Leptess/Tesseract engine implementation
//!
//! Tesseract-based OCR engine. Better for noisy/messy images like phone photos of
//! ID cards. Uses tesseract-static crate for static linking (no system dependencies).
//! Downloads tessdata (training data) automatically on first use.
//!
//! One configured Tesseract instance is kept per engine and reused across calls;
//! profile variables are applied once at creation.

use super::EngineOptions;
use crate::engine::{OcrEngine, OcrResult, RecognitionProfile};
use crate::error::OcrError;
use image::DynamicImage;
use tesseract_static::tesseract::{OcrEngineMode, Tesseract};

/// Tesseract OCR Engine
pub struct LeptessEngine {
    tessdata_path: String,
    language: String,
    profile: RecognitionProfile,
    /// Configured instance; `None` after a failed call consumed it
    tess: Option<Tesseract>,
}

impl LeptessEngine {
    /// Create a new Tesseract-based OCR engine
    pub fn new(options: &EngineOptions, profile: &RecognitionProfile) -> Result<Self, OcrError> {
        let tessdata_path = match &options.tessdata_path {
            Some(path) => path.clone(),
            None => ensure_tessdata_available(&options.language)?,
        };

        let tess = configure(&tessdata_path, &options.language, profile)?;

        tracing::info!(
            "Leptess engine initialized (tessdata: {}, language: {}, profile: {})",
            tessdata_path,
            options.language,
            profile.name
        );

        Ok(Self {
            tessdata_path,
            language: options.language.clone(),
            profile: profile.clone(),
            tess: Some(tess),
        })
    }

    fn take_instance(&mut self) -> Result<Tesseract, OcrError> {
        match self.tess.take() {
            Some(tess) => Ok(tess),
            None => configure(&self.tessdata_path, &self.language, &self.profile),
        }
    }
}

/// Create a Tesseract instance with every profile setting applied
fn configure(
    tessdata_path: &str,
    language: &str,
    profile: &RecognitionProfile,
) -> Result<Tesseract, OcrError> {
    let oem = if profile.lstm_only {
        OcrEngineMode::LstmOnly
    } else {
        OcrEngineMode::Default
    };

    let mut tess = Tesseract::new_with_oem(Some(tessdata_path), Some(language), oem)
        .map_err(|e| OcrError::InitializationError(format!("Failed to initialize Tesseract: {}", e)))?;

    let psm = (profile.page_segmentation as i32).to_string();
    let interword = if profile.preserve_interword_spaces { "1" } else { "0" };

    let mut variables: Vec<(&str, &str)> = vec![
        ("tessedit_pageseg_mode", psm.as_str()),
        ("preserve_interword_spaces", interword),
    ];
    if let Some(whitelist) = profile.char_whitelist {
        variables.push(("tessedit_char_whitelist", whitelist));
    }
    variables.extend(profile.variables.iter().copied());

    for (name, value) in variables {
        tess = tess.set_variable(name, value).map_err(|e| {
            OcrError::InitializationError(format!("Failed to set {}={}: {}", name, value, e))
        })?;
    }

    Ok(tess)
}

impl OcrEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn recognize(&mut self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let rgb_img = image.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        // BMP is always supported by leptonica
        let mut bmp_data = Vec::new();
        rgb_img
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Processing image: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        let tess = self.take_instance()?;

        let tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            OcrError::ProcessingError(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        let mut tess = tess
            .recognize()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to get text: {}", e)))?;

        // 0-100 scale
        let confidence = tess.mean_text_conf().clamp(0, 100) as f32 / 100.0;

        self.tess = Some(tess);

        Ok(OcrResult {
            text: text.trim().to_string(),
            confidence,
        })
    }
}

// ============================================================================
// Tessdata download helpers
// ============================================================================

/// Ensure tessdata is available, downloading if needed
fn ensure_tessdata_available(language: &str) -> Result<String, OcrError> {
    let tessdata_dir = super::cache_dir()?.join("tessdata");

    std::fs::create_dir_all(&tessdata_dir).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create tessdata directory: {}", e))
    })?;

    let traineddata_path = tessdata_dir.join(format!("{}.traineddata", language));

    if !traineddata_path.exists() {
        tracing::info!(
            "Downloading tessdata for '{}' (this may take a moment)...",
            language
        );
        super::download_file(&tessdata_url(language), &traineddata_path)?;
        tracing::info!("Downloaded tessdata to {:?}", traineddata_path);
    } else {
        tracing::debug!("Using cached tessdata from {:?}", tessdata_dir);
    }

    // Tesseract expects the directory, not the file
    tessdata_dir
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| OcrError::InitializationError("Invalid tessdata path".to_string()))
}

/// tessdata_fast models are LSTM-only, matching the profiles' engine mode
fn tessdata_url(language: &str) -> String {
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}
