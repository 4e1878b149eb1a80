pub mod classification;
pub mod intake;
pub mod metrics;

pub use classification::{ClassificationError, Classifier, DocumentIntelligenceClient};
pub use intake::{DocumentFetcher, IntakeError, StagedUpload};
pub use self::metrics::{get_metrics, init_metrics, record_classification};
