//! Core library for the website form submission service: validation, spam
//! heuristics, rate limiting and mail dispatch behind an axum router.

pub mod attachments;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod extractors;
pub mod forms;
pub mod handlers;
pub mod mail;
pub mod metrics;
pub mod middleware;
pub mod services;
pub mod spam;
pub mod validation;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use handlers::routes::create_routes;
pub use mail::{dispatcher_from_config, MailDispatcher, SharedDispatcher, TransportMode};
pub use metrics::SubmissionMetrics;
pub use middleware::cors::cors_layer_from_config;
pub use middleware::rate_limit::{ClientKey, RateLimiter};
pub use services::{SubmissionOutcome, SubmissionService};

use axum::{response::IntoResponse, response::Response, Router};
use std::{any::Any, net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub config: Arc<AppConfig>,
    pub contact_limiter: RateLimiter,
    pub careers_limiter: RateLimiter,
    pub submissions: SubmissionService,
    pub metrics: SubmissionMetrics,
}

impl AppState {
    pub fn new(config: AppConfig, dispatcher: SharedDispatcher, clock: SharedClock) -> Self {
        let metrics = SubmissionMetrics::new();
        let limits = &config.rate_limit;

        let contact_limiter = RateLimiter::new(limits.contact_max_requests, limits.window())
            .with_clock(clock.clone())
            .with_cleanup_probability(limits.cleanup_probability);
        let careers_limiter = RateLimiter::new(limits.careers_max_requests, limits.window())
            .with_clock(clock.clone())
            .with_cleanup_probability(limits.cleanup_probability);

        let submissions = SubmissionService::new(&config, dispatcher, clock, metrics.clone());

        Self {
            app_name: config.mail.site_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config: Arc::new(config),
            contact_limiter,
            careers_limiter,
            submissions,
            metrics,
        }
    }

    /// Picks the mail transport from configuration and uses the system clock.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let dispatcher = dispatcher_from_config(&config.mail)?;
        Ok(Self::new(config, dispatcher, Arc::new(SystemClock)))
    }

    pub fn limiters(&self) -> [&RateLimiter; 2] {
        [&self.contact_limiter, &self.careers_limiter]
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer_from_config(&state.config.cors);

    create_routes(&state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(middleware::logging::logging_layer())
        .with_state(state)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!("handler panicked: {}", detail);

    AppError::InternalServerError.into_response()
}

pub async fn run_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
