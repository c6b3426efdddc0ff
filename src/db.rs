//! Key-Value Store Layer
//!
//! Redis is the only shared mutable resource. All keys are namespaced by
//! purpose: `session:`, `user:`, `user-bells:`, `workout:`, `activity:`,
//! `push-sub:`, plus the rate limiter prefix.

use anyhow::Result;
use fred::prelude::*;
use tracing::info;

/// Create a Redis client and wait for the connection to come up.
pub async fn create_redis_client(redis_url: &str) -> Result<Client> {
    let config = Config::from_url(redis_url)?;
    let client = Client::new(config, None, None, None);
    client.connect();
    client.wait_for_connect().await?;

    info!("Connected to Redis");
    Ok(client)
}
