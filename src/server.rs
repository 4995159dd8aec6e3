use crate::certificate::{verify_name_match, AccreditedInstitutions, NameMatch};
use crate::config::Config;
use crate::error::{ApiError, ErrorResponse};
use crate::identity::ExtractionResult;
use crate::processor::{CertificateAnalysis, DocumentProcessor};
use crate::traffic_light::{evaluate, ProfileFacts, TrafficLightReport, TrafficLightScorer};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Largest number of certificates accepted in one upload
pub const MAX_BATCH_FILES: usize = 10;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<DocumentProcessor>,
    pub scorer: Arc<TrafficLightScorer>,
    pub config: Arc<Config>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdDocumentResponse {
    #[serde(flatten)]
    pub result: ExtractionResult,
    pub processing_time_ms: u64,
}

/// Outcome for one file of a certificate batch
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateOutcome {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<CertificateAnalysis>,
    /// Holder name against the applicant's names, when both were supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_match: Option<NameMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateBatchResponse {
    pub processed: usize,
    pub failed: usize,
    pub results: Vec<CertificateOutcome>,
    pub processing_time_ms: u64,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub version: String,
    pub engine: String,
    pub engine_description: String,
    pub engine_initialized: bool,
    pub ocr_language: String,
    pub id_document_formats: Vec<String>,
    pub certificate_formats: Vec<String>,
    pub max_file_size_bytes: usize,
    pub max_batch_files: usize,
    pub century_cutoff: u8,
    pub manual_entry_threshold: f32,
    pub accredited_institutions: usize,
    pub green_threshold: u8,
    pub yellow_threshold: u8,
}

/// Build the router over already constructed state
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/id-document", post(handle_id_document))
        .route(
            "/certificates",
            post(handle_certificates)
                .layer(DefaultBodyLimit::max(max_file_size.saturating_mul(MAX_BATCH_FILES))),
        )
        .route("/traffic-light", post(handle_traffic_light))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_file_size)),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config, accredited: AccreditedInstitutions) -> anyhow::Result<()> {
    let processor = Arc::new(DocumentProcessor::from_config(&config, accredited));
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        processor: Arc::clone(&processor),
        scorer: Arc::new(TrafficLightScorer::default()),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    processor.shutdown();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// One uploaded file
struct Upload {
    file_name: String,
    content_type: String,
    data: Bytes,
}

impl Upload {
    /// Temp file suffix; the processor dispatches on it
    fn suffix(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" => ".jpg",
            "image/png" => ".png",
            "application/pdf" => ".pdf",
            _ => {
                let ext = self
                    .file_name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_lowercase())
                    .unwrap_or_default();
                match ext.as_str() {
                    "jpg" | "jpeg" => ".jpg",
                    "png" => ".png",
                    "pdf" => ".pdf",
                    _ => ".tmp",
                }
            }
        }
    }

    /// Write to a temp file that is deleted when dropped
    fn persist(&self) -> Result<NamedTempFile, ApiError> {
        let mut temp_file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(self.suffix())
            .tempfile()
            .map_err(|e| ApiError::Internal(format!("Failed to create temp file: {}", e)))?;

        temp_file
            .write_all(&self.data)
            .map_err(|e| ApiError::Internal(format!("Failed to write temp file: {}", e)))?;

        Ok(temp_file)
    }
}

/// A parsed multipart form: every `file` field plus the short text fields
#[derive(Default)]
struct UploadForm {
    uploads: Vec<Upload>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

async fn read_form(multipart: &mut Multipart, max_size: usize) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name != "file" {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::InvalidRequest(format!("Invalid field {}: {}", name, e)))?;
            form.fields.insert(name, value);
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to read file data: {}", e)))?;

        if data.len() > max_size {
            return Err(ApiError::FileTooLarge {
                size: data.len(),
                max: max_size,
            });
        }

        form.uploads.push(Upload {
            file_name,
            content_type,
            data,
        });
    }

    Ok(form)
}

/// Handle ID document uploads
async fn handle_id_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IdDocumentResponse>, ApiError> {
    let start = Instant::now();

    let upload = read_form(&mut multipart, state.config.max_file_size)
        .await?
        .uploads
        .into_iter()
        .next()
        .ok_or(ApiError::MissingFile)?;
    let temp_file = upload.persist()?;

    let processor = Arc::clone(&state.processor);
    let mut result = tokio::task::spawn_blocking(move || {
        let result = processor.process_id_document(temp_file.path());
        // The ID image is removed here, before the response is sent
        drop(temp_file);
        result
    })
    .await
    .map_err(|e| ApiError::Internal(format!("ID processing task failed: {}", e)))??;

    let threshold = state.config.manual_entry_threshold;
    if result.success && result.is_low_confidence(threshold) {
        tracing::info!(
            "Confidence {:.0}% below {:.0}%, flagging for manual entry",
            result.confidence * 100.0,
            threshold * 100.0
        );
        result.requires_manual_entry = true;
    }

    Ok(Json(IdDocumentResponse {
        result,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

/// Handle certificate batches; each file succeeds or fails on its own.
/// Optional `firstName` and `surname` fields add a holder-name match per file.
async fn handle_certificates(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CertificateBatchResponse>, ApiError> {
    let start = Instant::now();

    let form = read_form(&mut multipart, state.config.max_file_size).await?;
    let applicant = form.field("firstName").zip(form.field("surname"));
    let uploads = &form.uploads;
    if uploads.is_empty() {
        return Err(ApiError::MissingFile);
    }
    if uploads.len() > MAX_BATCH_FILES {
        return Err(ApiError::InvalidRequest(format!(
            "At most {} certificates per request, got {}",
            MAX_BATCH_FILES,
            uploads.len()
        )));
    }

    let temp_files = uploads
        .iter()
        .map(Upload::persist)
        .collect::<Result<Vec<_>, _>>()?;
    let paths = temp_files.iter().map(|f| f.path().to_path_buf()).collect();

    let outcomes = Arc::clone(&state.processor)
        .process_certificates(paths)
        .await;
    drop(temp_files);

    let results: Vec<CertificateOutcome> = uploads
        .iter()
        .zip(outcomes)
        .map(|(upload, outcome)| match outcome {
            Ok(analysis) => CertificateOutcome {
                file_name: upload.file_name.clone(),
                name_match: applicant.zip(analysis.record.holder_name.as_deref()).map(
                    |((first_name, surname), holder)| verify_name_match(holder, first_name, surname),
                ),
                analysis: Some(analysis),
                error: None,
            },
            Err(e) => {
                tracing::warn!("Certificate {} failed: {}", upload.file_name, e);
                CertificateOutcome {
                    file_name: upload.file_name.clone(),
                    analysis: None,
                    name_match: None,
                    error: Some(ErrorResponse::from(&e)),
                }
            }
        })
        .collect();

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let processing_time_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Certificate batch of {} finished in {}ms, {} failed",
        results.len(),
        processing_time_ms,
        failed
    );

    Ok(Json(CertificateBatchResponse {
        processed: results.len() - failed,
        failed,
        results,
        processing_time_ms,
    }))
}

/// Score profile facts supplied by the caller
async fn handle_traffic_light(
    State(state): State<AppState>,
    Json(facts): Json<ProfileFacts>,
) -> Json<TrafficLightReport> {
    Json(evaluate(&state.scorer, &facts))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let config = &state.config;
    let thresholds = state.scorer.thresholds();

    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: config.engine.name().to_string(),
        engine_description: config.engine.description().to_string(),
        engine_initialized: state.processor.id_recognizer().is_initialized()
            || state.processor.certificate_recognizer().is_initialized(),
        ocr_language: config.ocr_language.clone(),
        id_document_formats: vec!["image/jpeg".to_string()],
        certificate_formats: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "application/pdf".to_string(),
        ],
        max_file_size_bytes: config.max_file_size,
        max_batch_files: MAX_BATCH_FILES,
        century_cutoff: config.century_rule.cutoff(),
        manual_entry_threshold: config.manual_entry_threshold,
        accredited_institutions: state.processor.certificate_parser().accredited().len(),
        green_threshold: thresholds.green,
        yellow_threshold: thresholds.yellow,
    })
}
