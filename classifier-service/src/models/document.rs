use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw document bytes as received from an upload or a fetched URL.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub bytes: Bytes,
    /// Content type declared by the uploader or the remote server.
    pub content_type: String,
}

impl DocumentPayload {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One document detected by the classifier.
///
/// Held as the raw JSON record so the list reaches the caller exactly as the
/// service produced it, `docType` included whatever its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassifiedDocument(pub Value);

impl ClassifiedDocument {
    /// The `docType` label, when the service sent one as a string.
    pub fn doc_type(&self) -> Option<&str> {
        self.0.get("docType").and_then(Value::as_str)
    }
}
