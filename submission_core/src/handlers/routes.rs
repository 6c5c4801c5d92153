//! Route table for the submission endpoints

use super::{
    careers::{handle_careers, handle_positions},
    contact::handle_contact,
    health::handle_health,
    metrics::handle_metrics,
};
use crate::{
    config::AttachmentConfig,
    middleware::rate_limit::{rate_limit_middleware, RateLimiter},
    AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

/// Room for the text parts and multipart framing around the CV.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn create_routes(state: &AppState) -> Router<AppState> {
    let rate_limit = &state.config.rate_limit;

    let contact = limited(
        Router::new().route("/api/contact", post(handle_contact)),
        rate_limit.enable.then(|| state.contact_limiter.clone()),
    );

    let careers = limited(
        Router::new()
            .route("/api/careers", post(handle_careers))
            .layer(DefaultBodyLimit::max(careers_body_limit(
                &state.config.attachments,
            ))),
        rate_limit.enable.then(|| state.careers_limiter.clone()),
    );

    Router::new()
        .route("/health", get(handle_health))
        .route("/metrics", get(handle_metrics))
        .route("/api/careers/positions", get(handle_positions))
        .merge(contact)
        .merge(careers)
}

/// Limits are route layers so that rejected requests never have their body
/// read.
fn limited(router: Router<AppState>, limiter: Option<RateLimiter>) -> Router<AppState> {
    match limiter {
        Some(limiter) => router.route_layer(from_fn_with_state(limiter, rate_limit_middleware)),
        None => router,
    }
}

pub fn careers_body_limit(config: &AttachmentConfig) -> usize {
    usize::try_from(config.max_cv_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES)
}
