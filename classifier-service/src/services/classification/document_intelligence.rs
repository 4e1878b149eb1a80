//! Document Intelligence custom classifier client.
//!
//! Submits raw bytes to `documentClassifiers/{id}:analyze`, then polls the
//! returned `Operation-Location` until the operation reaches a terminal state.

use super::{ClassificationError, Classifier, OperationStatus, ServiceError};
use crate::config::{DocumentIntelligenceConfig, PollingConfig};
use crate::models::{ClassifiedDocument, DocumentPayload};
use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "Operation-Location";
const RETRY_AFTER_MS_HEADER: &str = "retry-after-ms";

/// Long-running operation handle returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle(Url);

impl OperationHandle {
    pub fn url(&self) -> &Url {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: OperationStatus,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    #[serde(default)]
    documents: Option<Vec<ClassifiedDocument>>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ServiceError,
}

pub struct DocumentIntelligenceClient {
    client: Client,
    endpoint: String,
    api_key: Secret<String>,
    classifier_id: String,
    api_version: String,
    polling: PollingConfig,
}

impl DocumentIntelligenceClient {
    pub fn new(
        config: &DocumentIntelligenceConfig,
        polling: PollingConfig,
    ) -> Result<Self, ClassificationError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            classifier_id: config.classifier_id.clone(),
            api_version: config.api_version.clone(),
            polling,
        })
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/documentintelligence/documentClassifiers/{}:analyze?api-version={}",
            self.endpoint, self.classifier_id, self.api_version
        )
    }

    /// Submit the document. Anything other than `202 Accepted` with an
    /// `Operation-Location` header is a rejection.
    pub async fn submit(
        &self,
        payload: &DocumentPayload,
    ) -> Result<OperationHandle, ClassificationError> {
        let response = self
            .client
            .post(self.analyze_url())
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(payload.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let error = error_payload(response).await;
            return Err(ClassificationError::Rejected { status, error });
        }

        let handle = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Url::parse(v).ok())
            .map(OperationHandle)
            .ok_or(ClassificationError::MissingOperationHandle)?;

        tracing::info!(
            classifier_id = %self.classifier_id,
            size = payload.len(),
            content_type = %payload.content_type,
            operation = %handle.url().path(),
            "Document submitted for classification"
        );

        Ok(handle)
    }

    /// Query the operation status once, returning the service's suggested wait.
    async fn poll_once(
        &self,
        handle: &OperationHandle,
    ) -> Result<(AnalyzeOperation, Option<Duration>), ClassificationError> {
        let response = self
            .client
            .get(handle.url().clone())
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = error_payload(response).await;
            return Err(ClassificationError::PollFailed { status, error });
        }

        let wait = retry_after(response.headers());
        let operation = response.json::<AnalyzeOperation>().await?;
        Ok((operation, wait))
    }

    /// Poll until the operation succeeds or fails. Not bounded on its own;
    /// [`Classifier::classify`] wraps it in the configured timeout.
    pub async fn poll_until_done(
        &self,
        handle: &OperationHandle,
    ) -> Result<Vec<ClassifiedDocument>, ClassificationError> {
        let mut schedule = ExponentialBackoff {
            current_interval: self.polling.initial_interval,
            initial_interval: self.polling.initial_interval,
            max_interval: self.polling.max_interval,
            randomization_factor: 0.2,
            multiplier: 1.5,
            max_elapsed_time: None,
            ..Default::default()
        };
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let (operation, suggested_wait) = self.poll_once(handle).await?;
            metrics::counter!("classification_polls_total").increment(1);

            match operation.status {
                OperationStatus::Succeeded => {
                    tracing::info!(attempt, "Classification operation succeeded");
                    return Ok(operation
                        .analyze_result
                        .and_then(|result| result.documents)
                        .unwrap_or_default());
                }
                status if status.is_terminal() => {
                    return Err(ClassificationError::OperationFailed {
                        status,
                        error: operation.error.unwrap_or_else(ServiceError::missing),
                    });
                }
                status => {
                    // A suggested wait never drops below the configured floor.
                    let wait = suggested_wait
                        .map(|wait| wait.max(self.polling.initial_interval))
                        .or_else(|| schedule.next_backoff())
                        .unwrap_or(self.polling.max_interval);
                    tracing::debug!(
                        attempt,
                        status = ?status,
                        wait_ms = wait.as_millis() as u64,
                        "Classification operation still in progress"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

#[async_trait]
impl Classifier for DocumentIntelligenceClient {
    async fn classify(
        &self,
        payload: DocumentPayload,
    ) -> Result<Vec<ClassifiedDocument>, ClassificationError> {
        let handle = self.submit(&payload).await?;
        drop(payload);

        let documents = tokio::time::timeout(self.polling.timeout, self.poll_until_done(&handle))
            .await
            .map_err(|_| ClassificationError::TimedOut(self.polling.timeout))??;

        if documents.is_empty() {
            return Err(ClassificationError::NoDocuments);
        }

        Ok(documents)
    }
}

/// Best-effort extraction of the `{ "error": { ... } }` envelope.
async fn error_payload(response: Response) -> ServiceError {
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error,
        Err(_) => ServiceError::missing(),
    }
}

/// `retry-after-ms` takes precedence over the whole-second `Retry-After`.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let parse = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    };

    parse(RETRY_AFTER_MS_HEADER)
        .map(Duration::from_millis)
        .or_else(|| parse(RETRY_AFTER.as_str()).map(Duration::from_secs))
}
