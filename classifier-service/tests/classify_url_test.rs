mod common;

use common::{accept_submission, complete_after, sample_documents, sample_pdf, submission, TestApp};
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn post_url(app: &TestApp, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/classify/url", app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.")
}

async fn serve_document(server: &MockServer) -> String {
    Mock::given(method("GET"))
        .and(path("/files/statement.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(sample_pdf()),
        )
        .expect(1)
        .mount(server)
        .await;
    format!("{}/files/statement.pdf", server.uri())
}

#[tokio::test]
async fn classify_remote_document_returns_documents() {
    let server = MockServer::start().await;
    let document_url = serve_document(&server).await;
    accept_submission(&server).await;
    complete_after(&server, 1, sample_documents()).await;
    let app = TestApp::spawn(&server).await;

    let response = post_url(&app, json!({ "documentUrl": document_url })).await;

    assert_eq!(StatusCode::OK, response.status());
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, sample_documents());
    app.cleanup().await;
}

#[tokio::test]
async fn empty_body_is_bad_request() {
    let server = MockServer::start().await;
    submission()
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;
    let app = TestApp::spawn(&server).await;

    let response = post_url(&app, json!({})).await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(response.text().await.unwrap(), "Document URL is required");
    app.cleanup().await;
}

#[tokio::test]
async fn failed_fetch_skips_classification() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/gone.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    submission()
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;
    let app = TestApp::spawn(&server).await;

    let response = post_url(
        &app,
        json!({ "documentUrl": format!("{}/files/gone.pdf", server.uri()) }),
    )
    .await;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    assert_eq!(response.text().await.unwrap(), "Error classifying document");
    app.cleanup().await;
}

#[tokio::test]
async fn empty_result_is_server_error() {
    let server = MockServer::start().await;
    let document_url = serve_document(&server).await;
    accept_submission(&server).await;
    complete_after(&server, 0, json!([])).await;
    let app = TestApp::spawn(&server).await;

    let response = post_url(&app, json!({ "documentUrl": document_url })).await;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    assert_eq!(
        response.text().await.unwrap(),
        "Failed to extract any documents."
    );
    app.cleanup().await;
}
