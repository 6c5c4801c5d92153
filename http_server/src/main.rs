//! Main entry point for the form submission server binary

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use submission_core::{create_app, run_server, AppConfig, AppState, RateLimiter};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let state = AppState::from_config(config)?;

    info!("App: {} v{}", state.app_name, state.version);
    info!(
        mail_transport = ?state.submissions.transport_mode(),
        rate_limit = state.config.rate_limit.enable,
        "Submission pipeline ready"
    );

    if state.config.rate_limit.enable {
        let limiters: Vec<RateLimiter> = state.limiters().into_iter().cloned().collect();
        spawn_limiter_sweep(limiters, state.config.rate_limit.window());
        info!(
            "Started rate limit sweep (every {}s)",
            state.config.rate_limit.window_seconds
        );
    }

    let app = create_app(state);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Drops expired limiter records once per window, so memory stays bounded
/// even when no requests arrive to trigger opportunistic cleanup.
fn spawn_limiter_sweep(limiters: Vec<RateLimiter>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed: usize = limiters.iter().map(RateLimiter::purge_expired).sum();
            if removed > 0 {
                debug!(removed, "purged expired rate limit records");
            }
        }
    });
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default_level = if cfg!(debug_assertions) {
            "debug"
        } else {
            "info"
        };

        format!(
            "{}={},submission_core={},tower_http=debug,axum=debug",
            env!("CARGO_CRATE_NAME").replace('-', "_"),
            default_level,
            default_level
        )
        .into()
    });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
