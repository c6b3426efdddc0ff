//! Ironbell Server - Main Entry Point

use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;

use ironbell::{api, config, db};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ironbell=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Ironbell");

    if config.auth_password.is_none() {
        tracing::warn!("AUTH_PASSWORD is not set; all logins will fail until it is configured");
    }

    // Initialize Redis
    let redis = db::create_redis_client(&config.redis_url).await?;

    // Initialize rate limiter (optional)
    let rate_limiter = {
        use ironbell::ratelimit::{RateLimitConfig, RateLimiter};

        let rl_config = RateLimitConfig::from_env();
        if rl_config.enabled {
            let mut limiter = RateLimiter::new(redis.clone(), rl_config);
            match limiter.init().await {
                Ok(()) => {
                    info!("Rate limiter initialized");
                    Some(limiter)
                }
                Err(e) => {
                    tracing::warn!(
                        "Rate limiter initialization failed: {}. Rate limiting disabled.",
                        e
                    );
                    None
                }
            }
        } else {
            info!("Rate limiting disabled by configuration");
            None
        }
    };

    // Build application state and router
    let state = api::AppState::new(redis, config.clone(), rate_limiter);
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("Server shutdown complete");

    Ok(())
}
