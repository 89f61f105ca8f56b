//! Smart Drainage API Server
//!
//! HTTP ingestion of water-level readings, with email alerts on critical levels.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod monitor;
mod routes;
mod settings;

pub use monitor::{DrainageMonitor, IngestOutcome, DEFAULT_DELIVERY_TIMEOUT};
pub use settings::{Settings, SettingsError};

use alerting::AlertConfig;
use data_validator::Validator;
use notifier::{EmailNotifier, Notifier};

/// Application state shared across handlers
pub struct AppState {
    /// Store, debouncer and notifier
    pub monitor: Arc<DrainageMonitor>,
    /// Payload validator
    pub validator: Validator,
    /// Prometheus exporter, if a recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(monitor: Arc<DrainageMonitor>) -> Self {
        Self {
            monitor,
            validator: Validator::default(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route(
            "/data",
            get(routes::data::get_data).post(routes::data::post_data),
        )
        .route("/email-test", get(routes::email::email_test))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness handler
async fn root_handler() -> &'static str {
    "Smart Drainage backend is running"
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// Install the global metrics recorder
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics recorder not installed: {}", e);
            None
        }
    }
}

/// Log whether the notifier can reach its transport; never fatal
fn spawn_notifier_check(notifier: Arc<dyn Notifier>) {
    tokio::spawn(async move {
        match notifier.check().await {
            Ok(_) => info!("Email server is ready to send messages"),
            Err(e) => error!("Email configuration error: {}", e),
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the server
pub async fn run_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let notifier: Arc<dyn Notifier> = Arc::new(EmailNotifier::new(settings.email_config()));
    spawn_notifier_check(Arc::clone(&notifier));

    let monitor = Arc::new(DrainageMonitor::new(
        AlertConfig::default(),
        notifier,
        settings.notify_timeout(),
    ));

    let mut state = AppState::new(monitor);
    if let Some(handle) = init_metrics() {
        state = state.with_metrics(handle);
    }
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(settings.bind_addr()).await?;
    info!("Server running at http://127.0.0.1:{}", settings.port);
    info!(
        "Alert recipient: {}",
        settings.alert_user.as_deref().unwrap_or("<not configured>")
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
