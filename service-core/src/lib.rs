//! service-core: Shared infrastructure for the classifier relay services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
