use clap::Parser;
use std::path::PathBuf;

use crate::engines::EngineKind;
use crate::identity::CenturyRule;

#[derive(Parser, Debug)]
#[command(name = "onboarding-ocr-server")]
#[command(about = "ID extraction, certificate scoring and Traffic Light scoring service")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "ONBOARD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "ONBOARD_PORT", default_value = "9393")]
    pub port: u16,

    /// OCR engine to use ("ocrs" or "leptess"); defaults to the first one compiled in
    #[arg(long, env = "ONBOARD_ENGINE")]
    pub engine: Option<String>,

    /// Language for OCR (e.g., "eng")
    #[arg(long, env = "ONBOARD_OCR_LANGUAGE", default_value = "eng")]
    pub ocr_language: String,

    /// Path to tessdata directory (downloaded to the cache dir if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Maximum upload size in bytes (default: 10MB)
    #[arg(long, env = "ONBOARD_MAX_FILE_SIZE", default_value = "10485760")]
    pub max_file_size: usize,

    /// Two-digit years at or below this value decode to 20xx, above it to 19xx
    #[arg(long, env = "ONBOARD_CENTURY_CUTOFF", default_value = "21")]
    pub century_cutoff: u8,

    /// Newline-separated list of accredited institutions (replaces the built-in list)
    #[arg(long, env = "ONBOARD_ACCREDITED_FILE")]
    pub accredited_institutions: Option<PathBuf>,

    /// ID extractions below this confidence are flagged for manual entry
    #[arg(long, env = "ONBOARD_MANUAL_ENTRY_THRESHOLD", default_value = "0.6")]
    pub manual_entry_threshold: f32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub engine: EngineKind,
    pub ocr_language: String,
    pub tessdata_path: Option<String>,
    pub max_file_size: usize,
    pub century_rule: CenturyRule,
    pub accredited_institutions: Option<PathBuf>,
    pub manual_entry_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9393,
            engine: EngineKind::default(),
            ocr_language: "eng".to_string(),
            tessdata_path: None,
            max_file_size: 10 * 1024 * 1024,
            century_rule: CenturyRule::default(),
            accredited_institutions: None,
            manual_entry_threshold: 0.6,
        }
    }
}

impl TryFrom<Args> for Config {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let engine = match args.engine.as_deref() {
            Some(name) => EngineKind::from_name(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown or disabled OCR engine: {}", name))?,
            None => EngineKind::default(),
        };

        if !(0.0..=1.0).contains(&args.manual_entry_threshold) {
            anyhow::bail!(
                "manual entry threshold must be within 0..=1, got {}",
                args.manual_entry_threshold
            );
        }

        Ok(Self {
            host: args.host,
            port: args.port,
            engine,
            ocr_language: args.ocr_language,
            tessdata_path: args.tessdata_path,
            max_file_size: args.max_file_size,
            century_rule: CenturyRule::new(args.century_cutoff)?,
            accredited_institutions: args.accredited_institutions,
            manual_entry_threshold: args.manual_entry_threshold,
        })
    }
}
