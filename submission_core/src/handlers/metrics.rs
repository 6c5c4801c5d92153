//! Pipeline counters and limiter statistics

use crate::{middleware::rate_limit::RateLimiter, AppState};
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::{json, Value};
use tracing::debug;

pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    debug!("GET /metrics");

    Json(json!({
        "submissions": state.metrics.get_snapshot(),
        "rate_limit": {
            "enabled": state.config.rate_limit.enable,
            "window_seconds": state.config.rate_limit.window_seconds,
            "contact": limiter_stats(&state.contact_limiter),
            "careers": limiter_stats(&state.careers_limiter),
        },
    }))
}

fn limiter_stats(limiter: &RateLimiter) -> Value {
    json!({
        "max_requests": limiter.max_requests(),
        "tracked_clients": limiter.tracked_clients(),
        "rejected_total": limiter.rejected_total(),
    })
}
