//! Tracing subscriber setup shared by the binaries

use crate::config::ObservabilityConfig;
use tracing::Span;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Root span for a binary; every event emitted inside it carries the service name
pub fn service_span(config: &ObservabilityConfig) -> Span {
    tracing::info_span!("papershelf", service = %config.service_name)
}
