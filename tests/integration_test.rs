use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpStream;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

// Use atomic counter to give each test a unique port
static PORT_COUNTER: AtomicU16 = AtomicU16::new(9500);

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct InfoResponse {
    version: String,
    engine: String,
    engine_initialized: bool,
    id_document_formats: Vec<String>,
    certificate_formats: Vec<String>,
    max_file_size_bytes: usize,
    century_cutoff: u8,
    manual_entry_threshold: f32,
    accredited_institutions: usize,
    green_threshold: u8,
    yellow_threshold: u8,
}

struct TestServer {
    child: Child,
    port: u16,
}

impl TestServer {
    fn start() -> Self {
        Self::start_with(&[])
    }

    fn start_with(extra_args: &[&str]) -> Self {
        let port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);

        let child = Command::new(env!("CARGO_BIN_EXE_onboarding-ocr-server"))
            .args(["--host", "127.0.0.1", "--port", &port.to_string()])
            .args(extra_args)
            .spawn()
            .expect("Failed to start server");

        // Engines load lazily, so the port opens quickly
        let deadline = Instant::now() + Duration::from_secs(10);
        while TcpStream::connect(("127.0.0.1", port)).is_err() {
            assert!(Instant::now() < deadline, "server did not start on port {}", port);
            std::thread::sleep(Duration::from_millis(50));
        }

        Self { child, port }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

fn file_form(filename: &str, mime_type: &str, bytes: Vec<u8>) -> Form {
    let part = Part::bytes(bytes)
        .file_name(filename.to_string())
        .mime_str(mime_type)
        .unwrap();
    Form::new().part("file", part)
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let response: HealthResponse = client
        .get(server.url("/health"))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.status, "ok");
    assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_info_endpoint_reflects_config() {
    let server = TestServer::start_with(&["--century-cutoff", "25", "--manual-entry-threshold", "0.7"]);
    let client = reqwest::Client::new();

    let response: InfoResponse = client
        .get(server.url("/info"))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert!(!response.version.is_empty());
    assert_eq!(response.engine, "ocrs");
    // Nothing has been recognized yet
    assert!(!response.engine_initialized);
    assert_eq!(response.id_document_formats, vec!["image/jpeg".to_string()]);
    assert!(response
        .certificate_formats
        .contains(&"application/pdf".to_string()));
    assert_eq!(response.century_cutoff, 25);
    assert_eq!(response.manual_entry_threshold, 0.7);
    assert_eq!(response.accredited_institutions, 10);
    assert_eq!(response.green_threshold, 80);
    assert_eq!(response.yellow_threshold, 60);
}

#[tokio::test]
async fn test_traffic_light_scores_profile() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let facts = json!({
        "idExtractionConfidence": 0.97,
        "emailVerified": true,
        "emailVerificationHours": 3.0,
        "languages": [
            {"language": "English", "isVerified": true, "verificationMethod": "native"},
            {"language": "German", "isVerified": false}
        ],
        "certificates": [
            {"type": "academic", "isAccredited": true, "authenticityScore": 90, "holderName": "Maria Shikongo"}
        ],
        "firstName": "Maria",
        "surname": "Shikongo",
        "email": "maria@example.com",
        "phone": "+264811234567",
        "country": "Namibia",
        "profilePictureUrl": "/uploads/maria.jpg"
    });

    let response = client
        .post(server.url("/traffic-light"))
        .json(&facts)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let report: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(report["breakdown"]["identity"], 20);
    assert_eq!(report["breakdown"]["language"], 8);
    assert_eq!(report["breakdown"]["certificate"], 29);
    assert_eq!(report["breakdown"]["completeness"], 12);
    assert_eq!(report["breakdown"]["consistency"], 8);
    assert_eq!(report["total"], 77);
    assert_eq!(report["status"], "yellow");
    assert_eq!(report["level"], "Good");
    assert_eq!(report["maxScore"], 100);
    assert!(report["suggestions"].as_array().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn test_traffic_light_accepts_empty_profile() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let report: Value = client
        .post(server.url("/traffic-light"))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(report["total"], 8);
    assert_eq!(report["status"], "red");
}

#[tokio::test]
async fn test_id_document_rejects_png() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/id-document"))
        .multipart(file_form("id.png", "image/png", b"\x89PNG\r\n\x1a\n".to_vec()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "UNSUPPORTED_FORMAT");
}

#[tokio::test]
async fn test_id_document_requires_file() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let form = Form::new().text("note", "no file here");
    let response = client
        .post(server.url("/id-document"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_certificate_failures_are_reported_per_file() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let form = Form::new()
        .part(
            "file",
            Part::bytes(b"plain notes".to_vec())
                .file_name("notes.txt")
                .mime_str("text/plain")
                .unwrap(),
        )
        .part(
            "file",
            Part::bytes(b"more notes".to_vec())
                .file_name("cv.docx")
                .mime_str("application/octet-stream")
                .unwrap(),
        );

    let response = client
        .post(server.url("/certificates"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["processed"], 0);
    assert_eq!(body["failed"], 2);
    assert_eq!(body["results"][0]["fileName"], "notes.txt");
    assert_eq!(body["results"][0]["error"]["code"], "UNSUPPORTED_FORMAT");
    assert_eq!(body["results"][1]["fileName"], "cv.docx");
}
