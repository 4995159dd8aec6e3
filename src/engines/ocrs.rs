//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use. ocrs cannot
//! restrict its alphabet, so the profile whitelist is applied to its output.

use crate::engine::{OcrEngine, OcrResult, RecognitionProfile};
use crate::error::OcrError;
use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;
use std::path::PathBuf;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// OCR Engine wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
    profile: RecognitionProfile,
}

impl OcrsEngine {
    /// Create a new ocrs engine, downloading models if needed
    pub fn new(profile: RecognitionProfile) -> Result<Self, OcrError> {
        let detection_model_path =
            ensure_model_downloaded(DETECTION_MODEL_URL, "text-detection.rten")?;
        let recognition_model_path =
            ensure_model_downloaded(RECOGNITION_MODEL_URL, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            OcrError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized for {} profile", profile.name);

        Ok(Self { engine, profile })
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn recognize(&mut self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let rgb_img = image.to_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions).map_err(|e| {
            OcrError::ProcessingError(format!("Failed to create image source: {}", e))
        })?;

        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to detect words: {}", e)))?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        let lines: Vec<String> = line_texts
            .iter()
            .flatten()
            .map(|line| {
                line.words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        let raw = lines.join("\n");
        let text = self.profile.restrict(&raw);
        let quality = TextQuality::measure(line_rects.len(), lines.len(), &raw, &text);
        tracing::debug!("ocrs text quality: {:?}", quality);

        Ok(OcrResult {
            text,
            confidence: quality.confidence(),
        })
    }
}

// ============================================================================
// Confidence scoring
// ============================================================================

/// ocrs reports no per-character confidence, so confidence is estimated from
/// signals about the recognized lines. Every signal is in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TextQuality {
    /// Detected lines that produced text
    line_yield: f32,
    /// Characters that survived the profile whitelist
    kept: f32,
    /// Alphanumeric share of the non-space characters
    content: f32,
    /// Penalizes runs of one-character tokens, typical of speckle noise
    token_shape: f32,
    /// Penalizes long runs of one repeated character
    repetition: f32,
}

impl TextQuality {
    fn measure(detected_lines: usize, recognized_lines: usize, raw: &str, text: &str) -> Self {
        let line_yield = if detected_lines == 0 {
            0.0
        } else {
            recognized_lines as f32 / detected_lines as f32
        };

        let raw_len = raw.chars().filter(|c| !c.is_whitespace()).count();
        let kept_len = text.chars().filter(|c| !c.is_whitespace()).count();
        let kept = if raw_len == 0 {
            0.0
        } else {
            kept_len as f32 / raw_len as f32
        };

        Self {
            line_yield: line_yield.min(1.0),
            kept: kept.min(1.0),
            content: content_share(text),
            token_shape: token_shape(text),
            repetition: repetition(text),
        }
    }

    fn confidence(&self) -> f32 {
        if self.content == 0.0 {
            return 0.0;
        }
        let score = 0.30 * self.line_yield
            + 0.15 * self.kept
            + 0.25 * self.content
            + 0.15 * self.token_shape
            + 0.15 * self.repetition;
        score.clamp(0.0, 1.0)
    }
}

fn content_share(text: &str) -> f32 {
    let visible: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if visible.is_empty() {
        return 0.0;
    }
    let content = visible.iter().filter(|c| c.is_alphanumeric()).count();
    content as f32 / visible.len() as f32
}

fn token_shape(text: &str) -> f32 {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return 0.0;
    }
    let single = tokens.iter().filter(|t| t.chars().count() == 1).count();
    // Split ID numbers ("02 1115 0030 5") legitimately contain one stray digit
    let ratio = single as f32 / tokens.len() as f32;
    1.0 - (ratio * 1.5).min(1.0)
}

fn repetition(text: &str) -> f32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev = None;

    for c in text.chars() {
        if Some(c) == prev && !c.is_whitespace() && !c.is_ascii_digit() {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
        prev = Some(c);
    }

    match longest {
        0..=3 => 1.0,
        4..=5 => 0.7,
        _ => 0.3,
    }
}

/// Ensure model is downloaded and return its path
fn ensure_model_downloaded(url: &str, filename: &str) -> Result<PathBuf, OcrError> {
    let model_path = super::cache_dir()?.join(filename);

    if !model_path.exists() {
        tracing::info!("Downloading {} (this may take a moment)...", filename);
        super::download_file(url, &model_path)?;
        tracing::info!("Downloaded {} to {:?}", filename, model_path);
    } else {
        tracing::debug!("Using cached model from {:?}", model_path);
    }

    Ok(model_path)
}
