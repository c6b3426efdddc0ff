//! Rate limiting constants.

/// Lua script return codes
pub const SCRIPT_ALLOWED: i64 = 1;
pub const SCRIPT_DENIED: i64 = 0;

/// IPv6 prefix segments used for client identity (a /64 allocation)
pub const IPV6_PREFIX_SEGMENTS: usize = 4;

/// Bucket shared by clients whose address cannot be determined.
/// Acceptable only behind a trusted proxy that always sets the IP header.
pub const UNKNOWN_CLIENT: &str = "unknown";
