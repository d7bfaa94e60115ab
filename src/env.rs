/// Environment variable names used by this crate for convenient
/// configuration of the shipper from microservices.
///
/// These are purely helpers; the core sender types remain decoupled from
/// environment access.

/// Log collector destination URL, e.g. `udp://127.0.0.1:9999`.
pub const LOG_SHIPPER_URL_ENV: &str = "LOG_SHIPPER_URL";

/// Logical service name injected into every payload.
pub const LOG_SHIPPER_SERVICE_NAME_ENV: &str = "LOG_SHIPPER_SERVICE_NAME";

/// Service type injected into every payload.
pub const LOG_SHIPPER_SERVICE_TYPE_ENV: &str = "LOG_SHIPPER_SERVICE_TYPE";

/// Node identifier injected into every payload.
pub const LOG_SHIPPER_NODE_ID_ENV: &str = "LOG_SHIPPER_NODE_ID";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
