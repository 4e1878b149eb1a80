pub mod document;

pub use document::{ClassifiedDocument, DocumentPayload};
