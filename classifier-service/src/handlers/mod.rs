pub mod classify;
pub mod health;

pub use classify::{classify_file, classify_url};
pub use health::{health_check, metrics_endpoint, not_found};
