//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait for different
//! OCR backends. Engines are conditionally compiled based on feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

use crate::engine::{OcrEngine, RecognitionProfile};
use crate::error::OcrError;

/// Available engine backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Ocrs,
    Leptess,
}

impl Default for EngineKind {
    fn default() -> Self {
        if cfg!(feature = "engine-ocrs") {
            Self::Ocrs
        } else {
            Self::Leptess
        }
    }
}

impl EngineKind {
    /// Parse an engine name, returning None for unknown engines or engines that
    /// were not compiled in
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "ocrs" if cfg!(feature = "engine-ocrs") => Some(Self::Ocrs),
            "leptess" | "tesseract" if cfg!(feature = "engine-leptess") => Some(Self::Leptess),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ocrs => "ocrs",
            Self::Leptess => "leptess",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ocrs => "Pure Rust OCR engine - fast, no system dependencies required",
            Self::Leptess => "Tesseract OCR engine - better for noisy phone photos of ID cards",
        }
    }
}

/// Options shared by all engine backends
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub kind: EngineKind,
    pub language: String,
    pub tessdata_path: Option<String>,
}

/// Create and configure an engine for one recognition profile
pub fn create(
    options: &EngineOptions,
    profile: &RecognitionProfile,
) -> Result<Box<dyn OcrEngine>, OcrError> {
    tracing::info!(
        "Initializing {} engine for {} profile...",
        options.kind.name(),
        profile.name
    );

    match options.kind {
        #[cfg(feature = "engine-ocrs")]
        EngineKind::Ocrs => Ok(Box::new(ocrs::OcrsEngine::new(profile.clone())?)),

        #[cfg(feature = "engine-leptess")]
        EngineKind::Leptess => Ok(Box::new(leptess::LeptessEngine::new(options, profile)?)),

        #[allow(unreachable_patterns)]
        other => Err(OcrError::InitializationError(format!(
            "{} engine not available. Build with --features engine-{}",
            other.name(),
            other.name()
        ))),
    }
}

/// Download a file from URL to path using ureq
#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
pub(crate) fn download_file(url: &str, path: &std::path::Path) -> Result<(), OcrError> {
    use std::io::Write;

    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrError::InitializationError(format!("Failed to download {}: {}", url, e)))?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        OcrError::InitializationError(format!("Failed to read response body: {}", e))
    })?;

    let mut file = std::fs::File::create(path).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create {:?}: {}", path, e))
    })?;
    file.write_all(&buffer)
        .map_err(|e| OcrError::InitializationError(format!("Failed to write {:?}: {}", path, e)))?;

    Ok(())
}

/// Cache directory for downloaded models and training data
#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
pub(crate) fn cache_dir() -> Result<std::path::PathBuf, OcrError> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("onboarding-ocr");
    std::fs::create_dir_all(&dir).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;
    Ok(dir)
}
