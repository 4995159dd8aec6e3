use crate::error::OcrError;
use image::DynamicImage;

/// OCR processing result
#[derive(Debug, Clone)]
pub struct OcrResult {
    pub text: String,
    /// Engine confidence on a 0.0-1.0 scale
    pub confidence: f32,
}

/// Trait that all OCR engines must implement.
///
/// Engines are configured once for a [`RecognitionProfile`] when created and may
/// keep internal state between calls, hence `&mut self`. Callers serialize access.
pub trait OcrEngine: Send {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Recognize text in an already decoded raster image
    fn recognize(&mut self, image: &DynamicImage) -> Result<OcrResult, OcrError>;
}

/// Tesseract page segmentation modes used by the profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSegmentation {
    /// Fully automatic page segmentation (engine default)
    Auto = 3,
    /// Assume a single uniform block of text
    SingleBlock = 6,
}

/// Engine settings for one kind of document.
///
/// The ID profile restricts the alphabet and disables every language dictionary
/// except the numeric one: ID cards are full of proper nouns and digit codes that a
/// dictionary would "correct".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionProfile {
    pub name: &'static str,
    pub char_whitelist: Option<&'static str>,
    pub page_segmentation: PageSegmentation,
    /// Use the neural (LSTM) recognizer only
    pub lstm_only: bool,
    pub preserve_interword_spaces: bool,
    /// Tesseract variables applied verbatim at engine creation
    pub variables: &'static [(&'static str, &'static str)],
}

const ID_DOCUMENT_VARIABLES: &[(&str, &str)] = &[
    ("load_system_dawg", "0"),
    ("load_freq_dawg", "0"),
    ("load_unambig_dawg", "0"),
    ("load_punc_dawg", "0"),
    ("load_number_dawg", "1"),
    ("load_bigram_dawg", "0"),
];

impl RecognitionProfile {
    pub const ID_DOCUMENT: RecognitionProfile = RecognitionProfile {
        name: "id-document",
        char_whitelist: Some("ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 .()/"),
        page_segmentation: PageSegmentation::SingleBlock,
        lstm_only: true,
        preserve_interword_spaces: true,
        variables: ID_DOCUMENT_VARIABLES,
    };

    pub const CERTIFICATE: RecognitionProfile = RecognitionProfile {
        name: "certificate",
        char_whitelist: None,
        page_segmentation: PageSegmentation::Auto,
        lstm_only: true,
        preserve_interword_spaces: true,
        variables: &[],
    };

    /// Apply the character whitelist to text from engines that cannot restrict their
    /// own alphabet. Whitelisted profiles are uppercase-only, so text is uppercased
    /// first; line breaks always survive.
    pub fn restrict(&self, text: &str) -> String {
        match self.char_whitelist {
            None => text.to_string(),
            Some(allowed) => text
                .to_uppercase()
                .chars()
                .filter(|c| *c == '\n' || allowed.contains(*c))
                .collect(),
        }
    }
}
