//! Classification proxy abstractions.
//!
//! Handlers depend on the [`Classifier`] trait; the production implementation
//! talks to the Document Intelligence REST API.

pub mod document_intelligence;

pub use document_intelligence::DocumentIntelligenceClient;

use crate::models::{ClassifiedDocument, DocumentPayload};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Error payload embedded in service responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceError {
    #[serde(default = "unknown_code")]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

fn unknown_code() -> String {
    "Unknown".to_string()
}

impl ServiceError {
    /// Placeholder used when the service sent no parseable error payload.
    pub fn missing() -> Self {
        Self {
            code: unknown_code(),
            message: "no error payload returned".to_string(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Lifecycle states reported for a long-running classification operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl OperationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OperationStatus::NotStarted | OperationStatus::Running)
    }
}

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Submission rejected ({status}): {error}")]
    Rejected {
        status: StatusCode,
        error: ServiceError,
    },

    #[error("Submission accepted without a usable Operation-Location header")]
    MissingOperationHandle,

    #[error("Status query failed ({status}): {error}")]
    PollFailed {
        status: StatusCode,
        error: ServiceError,
    },

    #[error("Operation ended as {status:?}: {error}")]
    OperationFailed {
        status: OperationStatus,
        error: ServiceError,
    },

    #[error("Operation did not complete within {0:?}")]
    TimedOut(Duration),

    #[error("Failed to extract any documents")]
    NoDocuments,
}

/// Submits a document for classification and waits for the result.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Returns at least one classified document, or an error.
    async fn classify(
        &self,
        payload: DocumentPayload,
    ) -> Result<Vec<ClassifiedDocument>, ClassificationError>;
}
