use crate::config::ClassifierConfig;
use crate::handlers;
use crate::services::{Classifier, DocumentFetcher, DocumentIntelligenceClient};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: ClassifierConfig,
    pub classifier: Arc<dyn Classifier>,
    pub fetcher: DocumentFetcher,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: ClassifierConfig) -> Result<Self, AppError> {
        let classifier = DocumentIntelligenceClient::new(
            &config.document_intelligence,
            config.polling.clone(),
        )
        .map_err(|e| {
            tracing::error!("Failed to create classification client: {}", e);
            AppError::ConfigError(anyhow::Error::new(e))
        })?;

        let fetcher = DocumentFetcher::new(config.intake.fetch_timeout).map_err(|e| {
            tracing::error!("Failed to create document fetcher: {}", e);
            AppError::ConfigError(anyhow::Error::new(e))
        })?;

        tokio::fs::create_dir_all(&config.intake.upload_dir)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create upload directory {}: {}",
                    config.intake.upload_dir.display(),
                    e
                );
                e
            })?;

        let state = AppState {
            config: config.clone(),
            classifier: Arc::new(classifier),
            fetcher,
        };

        let app = router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            classifier_id = %config.document_intelligence.classifier_id,
            "Listening"
        );

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.intake.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/classify/file", post(handlers::classify_file))
        .route("/classify/url", post(handlers::classify_url))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
