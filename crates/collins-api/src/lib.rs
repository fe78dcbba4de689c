//! collins-api — HTTP surface of the Collins exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Landing page linking to the metrics |
//! | GET | `<telemetry-path>` (default `/metrics`) | Prometheus exposition |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use collins_metrics::Collector;

/// Shared state for handlers.
#[derive(Clone)]
pub struct ApiState {
    pub collector: Collector,
    pub telemetry_path: Arc<str>,
}

/// Build the exporter router.
///
/// A telemetry path without a leading slash gets one. When the telemetry
/// path is `/` the landing page is not mounted.
pub fn build_router(collector: Collector, telemetry_path: &str) -> Router {
    let telemetry_path = normalize_path(telemetry_path);
    let state = ApiState {
        collector,
        telemetry_path: Arc::from(telemetry_path.as_str()),
    };

    let router = Router::new().route(&telemetry_path, get(handlers::prometheus_metrics));
    let router = if telemetry_path == "/" {
        router
    } else {
        router.route("/", get(handlers::landing_page))
    };
    router.with_state(state)
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_get_leading_slash() {
        assert_eq!(normalize_path("metrics"), "/metrics");
        assert_eq!(normalize_path("/probe/metrics"), "/probe/metrics");
        assert_eq!(normalize_path(""), "/");
    }
}
