use crate::dtos::ClassifyUrlRequest;
use crate::error::ClassifyError;
use crate::models::ClassifiedDocument;
use crate::services::{record_classification, IntakeError, StagedUpload};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use std::time::Instant;

/// Multipart field carrying the uploaded document.
pub const DOCUMENT_FIELD: &str = "document";

pub async fn classify_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<ClassifiedDocument>>, ClassifyError> {
    let started = Instant::now();
    let result = classify_upload(&state, multipart).await;
    record_outcome("file", &result, started);
    result.map(Json)
}

pub async fn classify_url(
    State(state): State<AppState>,
    body: Result<Json<ClassifyUrlRequest>, JsonRejection>,
) -> Result<Json<Vec<ClassifiedDocument>>, ClassifyError> {
    let started = Instant::now();
    let result = classify_remote(&state, body).await;
    record_outcome("url", &result, started);
    result.map(Json)
}

async fn classify_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<Vec<ClassifiedDocument>, ClassifyError> {
    // Owned until this function returns; dropping it deletes the temp file.
    let upload = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(IntakeError::from)?
            .ok_or(ClassifyError::MissingDocumentFile)?;

        // A `document` text field without a filename is not a file part.
        if field.name() == Some(DOCUMENT_FIELD) && field.file_name().is_some() {
            break StagedUpload::stage(field, &state.config.intake.upload_dir).await?;
        }
    };

    tracing::info!(
        path = %upload.path().display(),
        size = upload.size(),
        "Document upload staged"
    );

    let payload = upload.read_payload().await?;
    Ok(state.classifier.classify(payload).await?)
}

async fn classify_remote(
    state: &AppState,
    body: Result<Json<ClassifyUrlRequest>, JsonRejection>,
) -> Result<Vec<ClassifiedDocument>, ClassifyError> {
    let document_url = match body {
        Ok(Json(request)) => request.document_url,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable classify-by-URL body");
            None
        }
    }
    .filter(|url| !url.trim().is_empty())
    .ok_or(ClassifyError::MissingDocumentUrl)?;

    tracing::info!(document_url = %document_url, "Fetching document");

    let payload = state.fetcher.fetch(&document_url).await?;
    Ok(state.classifier.classify(payload).await?)
}

fn record_outcome(
    source: &'static str,
    result: &Result<Vec<ClassifiedDocument>, ClassifyError>,
    started: Instant,
) {
    let outcome = match result {
        Ok(documents) => {
            tracing::info!(
                source,
                documents = documents.len(),
                doc_types = ?documents
                    .iter()
                    .filter_map(ClassifiedDocument::doc_type)
                    .collect::<Vec<_>>(),
                duration_ms = started.elapsed().as_millis() as u64,
                "Classification succeeded"
            );
            "succeeded"
        }
        Err(e) => e.outcome(),
    };
    record_classification(source, outcome, started.elapsed().as_secs_f64());
}
