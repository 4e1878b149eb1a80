use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_env_parsed};
use service_core::error::AppError;
use std::path::PathBuf;
use std::time::Duration;

/// REST api-version sent with every classification call.
const DEFAULT_API_VERSION: &str = "2024-11-30";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
const DEFAULT_POLL_MAX_INTERVAL_MS: u64 = 5_000;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 120;

const DEFAULT_UPLOAD_MAX_BYTES: usize = 50 * 1024 * 1024;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub common: core_config::Config,
    pub document_intelligence: DocumentIntelligenceConfig,
    pub polling: PollingConfig,
    pub intake: IntakeConfig,
}

/// Connection settings for the external classification service.
#[derive(Debug, Clone)]
pub struct DocumentIntelligenceConfig {
    pub endpoint: String,
    pub api_key: Secret<String>,
    /// Which trained classifier to invoke.
    pub classifier_id: String,
    pub api_version: String,
    /// Per-request limit on the submission and on each status query.
    pub request_timeout: Duration,
}

/// Poll schedule for long-running classification operations.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Wait before the second status query when the service sends no `Retry-After`.
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Budget for the whole poll loop; exceeding it fails the request.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub fetch_timeout: Duration,
}

impl ClassifierConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_prod();

        Ok(ClassifierConfig {
            common: common_config,
            document_intelligence: DocumentIntelligenceConfig {
                endpoint: get_env("DOCUMENT_INTELLIGENCE_ENDPOINT", None, is_prod)?,
                api_key: Secret::new(get_env("DOCUMENT_INTELLIGENCE_API_KEY", None, is_prod)?),
                classifier_id: get_env("CUSTOM_CLASSIFIER_ID", None, is_prod)?,
                api_version: get_env(
                    "DOCUMENT_INTELLIGENCE_API_VERSION",
                    Some(DEFAULT_API_VERSION),
                    is_prod,
                )?,
                request_timeout: Duration::from_secs(get_env_parsed(
                    "DOCUMENT_INTELLIGENCE_REQUEST_TIMEOUT_SECS",
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                    is_prod,
                )?),
            },
            polling: PollingConfig {
                initial_interval: Duration::from_millis(get_env_parsed(
                    "CLASSIFIER_POLL_INTERVAL_MS",
                    DEFAULT_POLL_INTERVAL_MS,
                    is_prod,
                )?),
                max_interval: Duration::from_millis(get_env_parsed(
                    "CLASSIFIER_POLL_MAX_INTERVAL_MS",
                    DEFAULT_POLL_MAX_INTERVAL_MS,
                    is_prod,
                )?),
                timeout: Duration::from_secs(get_env_parsed(
                    "CLASSIFIER_POLL_TIMEOUT_SECS",
                    DEFAULT_POLL_TIMEOUT_SECS,
                    is_prod,
                )?),
            },
            intake: IntakeConfig {
                upload_dir: PathBuf::from(get_env("UPLOAD_DIR", Some("uploads"), is_prod)?),
                max_upload_bytes: get_env_parsed(
                    "UPLOAD_MAX_BYTES",
                    DEFAULT_UPLOAD_MAX_BYTES,
                    is_prod,
                )?,
                fetch_timeout: Duration::from_secs(get_env_parsed(
                    "FETCH_TIMEOUT_SECS",
                    DEFAULT_FETCH_TIMEOUT_SECS,
                    is_prod,
                )?),
            },
        })
    }
}
