//! Document intake: staging multipart uploads and fetching remote documents.

use crate::models::DocumentPayload;
use axum::extract::multipart::{Field, MultipartError};
use reqwest::{header, Client};
use std::path::Path;
use std::time::Duration;
use tempfile::TempPath;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Failed to read multipart upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to stage upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to fetch document: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// An uploaded document written to a temporary file.
///
/// The file is removed when this value is dropped, whichever way the request ends.
#[derive(Debug)]
pub struct StagedUpload {
    path: TempPath,
    content_type: String,
    size: usize,
}

impl StagedUpload {
    /// Stream a multipart field into a fresh temporary file under `upload_dir`.
    pub async fn stage(mut field: Field<'_>, upload_dir: &Path) -> Result<Self, IntakeError> {
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let (file, path) = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(upload_dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut size = 0;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len();
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(
            path = %path.display(),
            content_type = %content_type,
            size,
            "Upload staged"
        );

        Ok(Self {
            path,
            content_type,
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Read the staged bytes back into memory for submission.
    pub async fn read_payload(&self) -> Result<DocumentPayload, IntakeError> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(DocumentPayload::new(bytes, self.content_type.clone()))
    }
}

/// Fetches documents referenced by URL.
#[derive(Clone)]
pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    pub fn new(timeout: Duration) -> Result<Self, IntakeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// GET the URL and return the body as raw bytes. Non-2xx statuses are failures.
    pub async fn fetch(&self, url: &str) -> Result<DocumentPayload, IntakeError> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = response.bytes().await?;

        tracing::debug!(
            url = %url,
            content_type = %content_type,
            size = bytes.len(),
            "Document fetched"
        );

        Ok(DocumentPayload::new(bytes, content_type))
    }
}
