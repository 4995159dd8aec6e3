//! Document pipeline for applicant onboarding.
//!
//! Photographed ID cards are preprocessed, recognized and parsed into identity
//! fields; certificates are classified and scored for authenticity; profile facts
//! are aggregated into a Traffic Light score. The `server` module exposes the
//! pipeline over HTTP.

pub mod certificate;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod identity;
pub mod patterns;
pub mod pdf;
pub mod preprocessing;
pub mod processor;
pub mod recognizer;
pub mod server;
pub mod traffic_light;

pub use engine::{OcrEngine, OcrResult, RecognitionProfile};
pub use error::{DocumentError, OcrError};
pub use processor::{CertificateAnalysis, DocumentProcessor, TextSource};
pub use recognizer::Recognizer;
