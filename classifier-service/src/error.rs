use crate::services::{ClassificationError, IntakeError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure of a classify request, from intake through polling.
///
/// Responses are plain text and never include vendor error codes or messages;
/// the full error is logged instead.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Document file is required")]
    MissingDocumentFile,

    #[error("Document URL is required")]
    MissingDocumentUrl,

    #[error("Intake failed: {0}")]
    Intake(#[from] IntakeError),

    #[error("Classification failed: {0}")]
    Classification(#[from] ClassificationError),
}

impl ClassifyError {
    /// Metric label for the request outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            ClassifyError::MissingDocumentFile | ClassifyError::MissingDocumentUrl => {
                "bad_request"
            }
            ClassifyError::Intake(_) => "intake_failed",
            ClassifyError::Classification(ClassificationError::NoDocuments) => "no_documents",
            ClassifyError::Classification(ClassificationError::Rejected { .. }) => "rejected",
            ClassifyError::Classification(ClassificationError::TimedOut(_)) => "timed_out",
            ClassifyError::Classification(_) => "failed",
        }
    }

    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            ClassifyError::MissingDocumentFile => {
                (StatusCode::BAD_REQUEST, "Document file is required")
            }
            ClassifyError::MissingDocumentUrl => (StatusCode::BAD_REQUEST, "Document URL is required"),
            ClassifyError::Classification(ClassificationError::NoDocuments) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to extract any documents.",
            ),
            ClassifyError::Intake(_) | ClassifyError::Classification(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error classifying document",
            ),
        }
    }
}

impl IntoResponse for ClassifyError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, outcome = self.outcome(), "Classification request failed");
        } else {
            tracing::warn!(error = %self, "Classification request rejected");
        }

        (status, message).into_response()
    }
}
