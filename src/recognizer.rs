//! Text recognizer: an explicit handle around one lazily created OCR engine
//!
//! The engine is expensive to initialize, so it is created on first use and then
//! reused for every call with the same profile. Engines are not re-entrant; the
//! handle serializes calls through a single-slot mutex.

use crate::engine::{OcrEngine, OcrResult, RecognitionProfile};
use crate::engines::{self, EngineOptions};
use crate::error::OcrError;
use crate::pdf;
use image::DynamicImage;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Builds a configured engine for a profile
pub type EngineFactory =
    Box<dyn Fn(&RecognitionProfile) -> Result<Box<dyn OcrEngine>, OcrError> + Send + Sync>;

pub struct Recognizer {
    profile: RecognitionProfile,
    factory: EngineFactory,
    engine: Mutex<Option<Box<dyn OcrEngine>>>,
}

impl Recognizer {
    pub fn new(profile: RecognitionProfile, factory: EngineFactory) -> Self {
        Self {
            profile,
            factory,
            engine: Mutex::new(None),
        }
    }

    /// Recognizer backed by one of the compiled-in engines
    pub fn with_engine(profile: RecognitionProfile, options: EngineOptions) -> Self {
        Self::new(
            profile,
            Box::new(move |profile: &RecognitionProfile| {
                engines::create(&options, profile)
            }),
        )
    }

    pub fn profile(&self) -> &RecognitionProfile {
        &self.profile
    }

    /// Create the engine now instead of on the first call
    pub fn init(&self) -> Result<(), OcrError> {
        let mut slot = self.lock();
        self.ensure_engine(&mut slot)?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_some()
    }

    /// Name of the live engine, if one has been created
    pub fn engine_name(&self) -> Option<&'static str> {
        self.lock().as_ref().map(|engine| engine.name())
    }

    /// Drop the engine; the next call initializes a fresh one
    pub fn shutdown(&self) {
        if let Some(engine) = self.lock().take() {
            tracing::info!("Shutting down {} engine ({} profile)", engine.name(), self.profile.name);
        }
    }

    /// Recognize text in a raster image file. PDFs are rejected: their text has to
    /// come from the PDF text layer instead.
    pub fn recognize(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        if pdf::is_pdf(image_path) {
            return Err(OcrError::UnsupportedFormat(format!(
                "{:?} is a PDF; extract its text layer instead",
                image_path
            )));
        }

        let image = image::open(image_path)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to load image: {}", e)))?;

        self.recognize_image(&image)
    }

    pub fn recognize_image(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let mut slot = self.lock();
        let engine = self.ensure_engine(&mut slot)?;

        let mut result = engine.recognize(image)?;
        result.confidence = result.confidence.clamp(0.0, 1.0);

        tracing::info!(
            "{} recognized {} chars in {}ms, confidence: {:.0}%",
            engine.name(),
            result.text.len(),
            start.elapsed().as_millis(),
            result.confidence * 100.0
        );

        Ok(result)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn OcrEngine>>> {
        // A panic inside an engine call leaves the slot usable; the engine is
        // re-created on demand if it was dropped.
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_engine<'a>(
        &self,
        slot: &'a mut Option<Box<dyn OcrEngine>>,
    ) -> Result<&'a mut Box<dyn OcrEngine>, OcrError> {
        if slot.is_none() {
            let engine = (self.factory)(&self.profile)?;
            tracing::info!(
                "{} engine ready for {} profile",
                engine.name(),
                self.profile.name
            );
            *slot = Some(engine);
        }
        slot.as_mut()
            .ok_or_else(|| OcrError::InitializationError("engine slot empty".to_string()))
    }
}
