//! Document processing: preprocess → recognize → parse
//!
//! [`DocumentProcessor`] owns one recognizer per document kind plus the parsers,
//! and turns an uploaded file path into an [`ExtractionResult`] or a scored
//! [`CertificateRecord`]. It never persists anything and never deletes the input;
//! intermediate files it creates itself are removed before returning.

use crate::certificate::{
    verify_german_certificate, AccreditedInstitutions, CertificateParser, CertificateRecord,
    GermanVerification,
};
use crate::config::Config;
use crate::engine::RecognitionProfile;
use crate::engines::EngineOptions;
use crate::error::{DocumentError, OcrError};
use crate::identity::{ExtractionResult, IdFieldParser};
use crate::pdf;
use crate::preprocessing;
use crate::recognizer::Recognizer;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// ID documents are accepted as JPEG photos only
const ID_DOCUMENT_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

const CERTIFICATE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

/// Where the text of a certificate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextSource {
    /// Embedded PDF text layer
    PdfText,
    /// OCR over the images embedded in a scanned PDF
    PdfImages,
    /// OCR over an uploaded image
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAnalysis {
    #[serde(flatten)]
    pub record: CertificateRecord,
    pub confidence: f32,
    pub source: TextSource,
    /// Present only for German language certificates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub german_verification: Option<GermanVerification>,
}

pub struct DocumentProcessor {
    id_parser: IdFieldParser,
    certificate_parser: CertificateParser,
    id_recognizer: Recognizer,
    certificate_recognizer: Recognizer,
}

impl DocumentProcessor {
    pub fn new(
        id_parser: IdFieldParser,
        certificate_parser: CertificateParser,
        id_recognizer: Recognizer,
        certificate_recognizer: Recognizer,
    ) -> Self {
        Self {
            id_parser,
            certificate_parser,
            id_recognizer,
            certificate_recognizer,
        }
    }

    /// Processor using the configured engine for both document kinds
    pub fn from_config(config: &Config, accredited: AccreditedInstitutions) -> Self {
        let options = EngineOptions {
            kind: config.engine,
            language: config.ocr_language.clone(),
            tessdata_path: config.tessdata_path.clone(),
        };

        Self::new(
            IdFieldParser::new(config.century_rule),
            CertificateParser::new(accredited),
            Recognizer::with_engine(RecognitionProfile::ID_DOCUMENT, options.clone()),
            Recognizer::with_engine(RecognitionProfile::CERTIFICATE, options),
        )
    }

    pub fn id_recognizer(&self) -> &Recognizer {
        &self.id_recognizer
    }

    pub fn certificate_recognizer(&self) -> &Recognizer {
        &self.certificate_recognizer
    }

    pub fn certificate_parser(&self) -> &CertificateParser {
        &self.certificate_parser
    }

    /// Release both engines
    pub fn shutdown(&self) {
        self.id_recognizer.shutdown();
        self.certificate_recognizer.shutdown();
    }

    /// Extract identity fields from a photographed ID card.
    ///
    /// A result with `success == false` is still `Ok`: the parser ran but found no
    /// valid ID number, and the result asks for manual entry.
    pub fn process_id_document(&self, path: &Path) -> Result<ExtractionResult, DocumentError> {
        if !has_extension(path, ID_DOCUMENT_EXTENSIONS) {
            return Err(DocumentError::UnsupportedFormat(format!(
                "ID documents must be JPG images, got {:?}",
                path.file_name().unwrap_or_default()
            )));
        }

        let start = Instant::now();
        let processed = preprocessing::preprocess(path).ok_or_else(|| {
            DocumentError::UnsupportedFormat(format!("{:?} cannot be preprocessed", path))
        })?;

        let recognized = self.id_recognizer.recognize(&processed);
        remove_intermediate(path, &processed);

        let ocr = recognized.map_err(|e| {
            tracing::warn!("ID recognition failed for {:?}: {}", path, e);
            DocumentError::ExtractionFailure(e.to_string())
        })?;
        tracing::debug!("ID OCR text:\n{}", ocr.text);

        let result = self.id_parser.parse(&ocr.text, ocr.confidence);
        tracing::info!(
            "ID document processed in {}ms, success: {}, confidence: {:.0}%",
            start.elapsed().as_millis(),
            result.success,
            result.confidence * 100.0
        );

        Ok(result)
    }

    /// Read, parse and score one certificate (image or PDF)
    pub fn process_certificate(&self, path: &Path) -> Result<CertificateAnalysis, DocumentError> {
        if !has_extension(path, CERTIFICATE_EXTENSIONS) && !pdf::is_pdf(path) {
            return Err(DocumentError::UnsupportedFormat(format!(
                "certificates must be JPG, PNG or PDF, got {:?}",
                path.file_name().unwrap_or_default()
            )));
        }

        let (text, confidence, source) =
            self.certificate_text(path)
                .map_err(|e| DocumentError::CertificateProcessingFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;

        tracing::info!(
            "Certificate text from {:?}: {} chars via {:?}",
            path.file_name().unwrap_or_default(),
            text.len(),
            source
        );

        let record = self.certificate_parser.analyze(&text);
        let german = verify_german_certificate(&record);
        let german_verification = german.level.is_some().then_some(german);

        Ok(CertificateAnalysis {
            record,
            confidence,
            source,
            german_verification,
        })
    }

    /// Process certificates concurrently on the blocking pool.
    ///
    /// Results come back in input order, one per path; a failure affects only its
    /// own entry.
    pub async fn process_certificates(
        self: Arc<Self>,
        paths: Vec<PathBuf>,
    ) -> Vec<Result<CertificateAnalysis, DocumentError>> {
        let tasks = paths.into_iter().map(|path| {
            let processor = Arc::clone(&self);
            async move {
                let task_path = path.clone();
                tokio::task::spawn_blocking(move || processor.process_certificate(&task_path))
                    .await
                    .unwrap_or_else(|e| {
                        Err(DocumentError::CertificateProcessingFailure {
                            path,
                            reason: format!("worker task failed: {}", e),
                        })
                    })
            }
        });

        futures::future::join_all(tasks).await
    }

    fn certificate_text(&self, path: &Path) -> Result<(String, f32, TextSource), OcrError> {
        if !pdf::is_pdf(path) {
            let ocr = self.certificate_recognizer.recognize(path)?;
            return Ok((ocr.text, ocr.confidence, TextSource::Image));
        }

        let text = match pdf::extract_text(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("PDF text layer unreadable, trying embedded images: {}", e);
                String::new()
            }
        };
        if text.chars().count() >= pdf::MIN_EMBEDDED_TEXT_LEN {
            return Ok((text, pdf::EMBEDDED_TEXT_CONFIDENCE, TextSource::PdfText));
        }

        let images = pdf::extract_images(path)?;
        if images.is_empty() {
            return Err(OcrError::ProcessingError(
                "PDF has no text layer and no embedded images".to_string(),
            ));
        }
        tracing::info!("Scanned PDF, running OCR on {} embedded images", images.len());

        let mut pages = Vec::with_capacity(images.len());
        let mut confidence_sum = 0.0;
        for image in &images {
            let ocr = self.certificate_recognizer.recognize_image(image)?;
            confidence_sum += ocr.confidence;
            if !ocr.text.trim().is_empty() {
                pages.push(ocr.text);
            }
        }

        let confidence = confidence_sum / images.len() as f32;
        Ok((pages.join("\n"), confidence, TextSource::PdfImages))
    }
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Remove the preprocessed copy; the original belongs to the caller
fn remove_intermediate(original: &Path, processed: &Path) {
    if processed == original {
        return;
    }
    if let Err(e) = std::fs::remove_file(processed) {
        tracing::warn!("Failed to remove intermediate {:?}: {}", processed, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_check_is_case_insensitive() {
        assert!(has_extension(Path::new("/tmp/id.JPG"), ID_DOCUMENT_EXTENSIONS));
        assert!(has_extension(Path::new("/tmp/id.jpeg"), ID_DOCUMENT_EXTENSIONS));
        assert!(!has_extension(Path::new("/tmp/id.png"), ID_DOCUMENT_EXTENSIONS));
        assert!(!has_extension(Path::new("/tmp/id"), ID_DOCUMENT_EXTENSIONS));
    }

    #[test]
    fn test_text_source_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(TextSource::PdfImages).unwrap(),
            serde_json::json!("pdf-images")
        );
    }

    #[test]
    fn test_remove_intermediate_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("id.jpg");
        std::fs::write(&original, b"jpeg").unwrap();

        remove_intermediate(&original, &original);
        assert!(original.exists());

        let processed = dir.path().join("id_processed.png");
        std::fs::write(&processed, b"png").unwrap();
        remove_intermediate(&original, &processed);
        assert!(!processed.exists());
        assert!(original.exists());
    }
}
