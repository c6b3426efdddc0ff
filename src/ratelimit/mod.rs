//! Rate limiting module for protecting against abuse.
//!
//! Redis-backed fixed-window limits keyed by (client, endpoint category).
//! Protects the login endpoint with a tight bucket and the general API with a
//! wide one.

pub mod config;
pub mod constants;
pub mod error;
pub mod ip;
pub mod limiter;
pub mod middleware;
pub mod types;

pub use config::*;
pub use constants::*;
pub use error::*;
pub use ip::*;
pub use limiter::*;
pub use middleware::{rate_limit_by_ip, with_category};
pub use types::*;
