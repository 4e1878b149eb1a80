#![allow(dead_code)]

use classifier_service::config::{
    ClassifierConfig, DocumentIntelligenceConfig, IntakeConfig, PollingConfig,
};
use classifier_service::startup::Application;
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_CLASSIFIER_ID: &str = "test-classifier";
pub const TEST_API_VERSION: &str = "2024-11-30";
pub const OPERATION_ID: &str = "3f1c5e2a-operation";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub upload_dir: PathBuf,
}

impl TestApp {
    /// Spawn the service against `classification_service`.
    pub async fn spawn(classification_service: &MockServer) -> Self {
        Self::spawn_with(classification_service, |_| {}).await
    }

    pub async fn spawn_with(
        classification_service: &MockServer,
        customize: impl FnOnce(&mut ClassifierConfig),
    ) -> Self {
        let upload_dir = PathBuf::from(format!("target/test-uploads-{}", Uuid::new_v4()));

        let mut config = ClassifierConfig {
            common: CoreConfig { port: 0 }, // Random port for testing
            document_intelligence: DocumentIntelligenceConfig {
                endpoint: classification_service.uri(),
                api_key: Secret::new(TEST_API_KEY.to_string()),
                classifier_id: TEST_CLASSIFIER_ID.to_string(),
                api_version: TEST_API_VERSION.to_string(),
                request_timeout: Duration::from_secs(5),
            },
            polling: PollingConfig {
                initial_interval: Duration::from_millis(10),
                max_interval: Duration::from_millis(50),
                timeout: Duration::from_secs(5),
            },
            intake: IntakeConfig {
                upload_dir: upload_dir.clone(),
                max_upload_bytes: 5 * 1024 * 1024,
                fetch_timeout: Duration::from_secs(5),
            },
        };
        customize(&mut config);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            upload_dir,
        }
    }

    /// Number of files currently staged in the upload directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.upload_dir).await;
    }
}

/// Documents as the classification service reports them.
pub fn sample_documents() -> Value {
    json!([
        {
            "docType": "invoice",
            "confidence": 0.947,
            "boundingRegions": [{ "pageNumber": 1, "polygon": [0, 0, 8.5, 0, 8.5, 11, 0, 11] }],
            "spans": [{ "offset": 0, "length": 0 }]
        }
    ])
}

pub fn operation_location(server: &MockServer) -> String {
    format!(
        "{}/documentintelligence/documentClassifiers/{}/analyzeResults/{}?api-version={}",
        server.uri(),
        TEST_CLASSIFIER_ID,
        OPERATION_ID,
        TEST_API_VERSION
    )
}

/// Matcher for the analyze submission.
pub fn submission() -> MockBuilder {
    Mock::given(method("POST"))
        .and(path(format!(
            "/documentintelligence/documentClassifiers/{}:analyze",
            TEST_CLASSIFIER_ID
        )))
        .and(query_param("api-version", TEST_API_VERSION))
        .and(header("Ocp-Apim-Subscription-Key", TEST_API_KEY))
        .and(header("content-type", "application/octet-stream"))
}

/// Matcher for status queries against the operation handle.
pub fn status_query() -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(format!(
            "/documentintelligence/documentClassifiers/{}/analyzeResults/{}",
            TEST_CLASSIFIER_ID, OPERATION_ID
        )))
        .and(header("Ocp-Apim-Subscription-Key", TEST_API_KEY))
}

/// Expect one accepted submission.
pub async fn accept_submission(server: &MockServer) {
    submission()
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("Operation-Location", operation_location(server).as_str()),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Report `running` for the first `pending_polls` queries, then `succeeded`
/// with the given documents.
pub async fn complete_after(server: &MockServer, pending_polls: u64, documents: Value) {
    if pending_polls > 0 {
        status_query()
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "running",
                "createdDateTime": "2024-05-01T12:00:00Z",
                "lastUpdatedDateTime": "2024-05-01T12:00:01Z"
            })))
            .up_to_n_times(pending_polls)
            .mount(server)
            .await;
    }

    status_query()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "succeeded",
            "createdDateTime": "2024-05-01T12:00:00Z",
            "lastUpdatedDateTime": "2024-05-01T12:00:03Z",
            "analyzeResult": {
                "apiVersion": TEST_API_VERSION,
                "modelId": TEST_CLASSIFIER_ID,
                "stringIndexType": "textElements",
                "content": "",
                "pages": [],
                "documents": documents
            }
        })))
        .mount(server)
        .await;
}

/// A ~10KB body that starts like a PDF.
pub fn sample_pdf() -> Vec<u8> {
    let mut bytes = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
    bytes.resize(10 * 1024, b'0');
    bytes.extend_from_slice(b"\n%%EOF\n");
    bytes
}
