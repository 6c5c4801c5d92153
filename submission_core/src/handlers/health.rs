//! Liveness endpoint

use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.get_snapshot();

    Json(serde_json::json!({
        "status": "healthy",
        "app": state.app_name,
        "version": state.version,
        "timestamp": chrono::Utc::now().timestamp(),
        "mail_transport": state.submissions.transport_mode(),
        "uptime_seconds": snapshot.uptime_seconds,
    }))
}
