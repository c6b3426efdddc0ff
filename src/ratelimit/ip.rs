//! Client identification for rate limiting.
//!
//! Behind the edge proxy the real client address arrives in the
//! `CF-Connecting-IP` header; direct connections fall back to the socket peer
//! address. When neither is available every request shares the
//! [`UNKNOWN_CLIENT`] bucket, which is only acceptable behind a trusted proxy.

use axum::extract::ConnectInfo;
use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

use crate::ratelimit::constants::{IPV6_PREFIX_SEGMENTS, UNKNOWN_CLIENT};

/// Header set by the edge proxy with the connecting client's address.
const CONNECTING_IP_HEADER: &str = "CF-Connecting-IP";

/// Derive the rate limit identifier for a request.
#[must_use]
pub fn client_identifier(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy: bool,
) -> String {
    if trust_proxy {
        if let Some(value) = headers.get(CONNECTING_IP_HEADER) {
            if let Ok(s) = value.to_str() {
                if let Ok(ip) = s.trim().parse() {
                    return normalize_ip(ip);
                }
            }
        }
    }

    connect_info
        .map(|c| normalize_ip(c.0.ip()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Normalize an IP address for rate limiting.
///
/// IPv4 addresses are kept as-is. IPv6 addresses are collapsed to their /64
/// prefix so one allocation cannot dodge the limiter by rotating addresses.
#[must_use]
pub fn normalize_ip(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => {
            let seg = v6.segments();
            let prefix: Vec<String> = (0..IPV6_PREFIX_SEGMENTS)
                .map(|i| format!("{:x}", seg[i]))
                .collect();
            format!("{}::/64", prefix.join(":"))
        }
    }
}
