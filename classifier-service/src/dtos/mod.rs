use serde::Deserialize;

/// Body of `POST /classify/url`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyUrlRequest {
    #[serde(default)]
    pub document_url: Option<String>,
}
