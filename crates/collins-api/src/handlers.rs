//! HTTP handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use tracing::{debug, error};

use collins_metrics::prometheus::CONTENT_TYPE;
use collins_metrics::render_prometheus;

use crate::ApiState;

/// GET /
pub async fn landing_page(State(state): State<ApiState>) -> impl IntoResponse {
    Html(format!(
        "<html>\n\
         <head><title>Collins Exporter</title></head>\n\
         <body>\n\
         <h1>Collins Exporter</h1>\n\
         <p><a href='{path}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        path = state.telemetry_path
    ))
}

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    match state.collector.collect().await {
        Ok(observations) => {
            debug!(observations = observations.len(), "serving metrics");
            (
                StatusCode::OK,
                [("content-type", CONTENT_TYPE)],
                render_prometheus(&observations),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "metrics collection failed");
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}
