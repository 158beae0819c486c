//! Papershelf API server
//!
//! Serves the paper and tag catalog over HTTP and owns process wiring:
//! - Configuration, tracing and the optional Prometheus exporter
//! - The catalog store handle shared by the API and ingestion
//! - The library folder watcher and its shutdown
//! - Request observability (logging, metrics, request ids)

mod handlers;
mod middleware;
#[cfg(test)]
mod tests;

use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::{delete, get, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use papershelf_common::{
    config::AppConfig, metrics, telemetry, LibraryService, Repository, VERSION,
};
use papershelf_ingestion::{start_watcher, IngestionPipeline};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn, Instrument};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub library: LibraryService,
    /// True while the library folder watcher is running
    pub watcher_running: Arc<AtomicBool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.observability);

    let span = telemetry::service_span(&config.observability);
    run(Arc::new(config)).instrument(span).await
}

async fn run(config: Arc<AppConfig>) -> anyhow::Result<()> {
    info!("Starting Papershelf server v{}", VERSION);

    // Initialize metrics
    if config.observability.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .add_global_label("service", config.observability.service_name.clone())
            .install()
            .context("Failed to start Prometheus exporter")?;
        info!("Metrics exporter listening on {}", addr);
    }
    metrics::register_metrics();

    // One store handle, shared by the API and ingestion
    let repository = Repository::open(&config.database)
        .await
        .context("Failed to open catalog")?;

    let pipeline = Arc::new(IngestionPipeline::new(repository.clone()));
    let watcher = start_watcher(&config.library, pipeline)
        .await
        .context("Failed to start library folder watcher")?;

    let watcher_running = Arc::new(AtomicBool::new(watcher.is_some()));
    let state = AppState {
        config: config.clone(),
        library: LibraryService::new(repository),
        watcher_running: watcher_running.clone(),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(watcher) = watcher {
        watcher_running.store(false, Ordering::SeqCst);
        if tokio::time::timeout(config.shutdown_timeout(), watcher.shutdown())
            .await
            .is_err()
        {
            warn!("Ingestion workers did not finish before the shutdown timeout");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Paper endpoints
        .route("/papers", get(handlers::papers::list_papers))
        .route("/papers/", get(handlers::papers::list_papers))
        .route(
            "/papers/{id}",
            get(handlers::papers::get_paper).delete(handlers::papers::delete_paper),
        )
        .route("/papers/{id}/pdf", get(handlers::papers::get_pdf))
        .route("/papers/{id}/tags", get(handlers::papers::list_paper_tags))
        .route(
            "/papers/{id}/tags/{tag_id}",
            put(handlers::papers::attach_tag).delete(handlers::papers::detach_tag),
        )

        // Tag endpoints
        .route(
            "/tags",
            get(handlers::tags::list_tags).post(handlers::tags::create_tag),
        )
        .route(
            "/tags/",
            get(handlers::tags::list_tags).post(handlers::tags::create_tag),
        )
        .route("/tags/{id}", delete(handlers::tags::delete_tag))
        .route_layer(from_fn(middleware::metrics::track_metrics));

    routes
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

/// CORS for the configured origins; `*` allows any
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
