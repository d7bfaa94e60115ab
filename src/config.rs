use url::Url;
use uuid::Uuid;

/// Transport schemes recognized in the log destination URL.
///
/// The set is closed: anything other than `udp` or `tcp` is rejected at
/// construction time. TCP parses but is not implemented on either send
/// path; see [`crate::transport::TransportError::Unsupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportScheme {
    Udp,
    Tcp,
}

/// Parsed log collector destination: scheme plus a mandatory `host:port`
/// pair. Built once from the configured URL and immutable afterwards.
#[derive(Debug, Clone)]
pub struct LogTarget {
    pub scheme: TransportScheme,
    pub host: String,
    pub port: u16,
}

impl LogTarget {
    /// Parse a destination URL of the form `scheme://host:port`.
    ///
    /// The scheme match is case-sensitive (`udp`, not `UDP`), and the
    /// `url` crate lowercases schemes during parsing, so the scheme is
    /// sniffed off the raw string first.
    ///
    /// **Returns**
    /// - `Ok(LogTarget)` for a well-formed `udp://` or `tcp://` URL.
    /// - `Err(ConfigError)` for any other scheme, or when host or port
    ///   is missing.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let scheme = if raw.starts_with("udp://") {
            TransportScheme::Udp
        } else if raw.starts_with("tcp://") {
            TransportScheme::Tcp
        } else {
            let scheme = raw.split("://").next().unwrap_or(raw);
            return Err(ConfigError::UnknownScheme(scheme.to_string()));
        };

        let parsed = Url::parse(raw)?;
        let host = parsed
            .host_str()
            .ok_or(ConfigError::MissingHost)?
            .to_string();
        let port = parsed.port().ok_or(ConfigError::MissingPort)?;

        Ok(LogTarget { scheme, host, port })
    }

    /// `host:port` form suitable for `connect`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Identity of the service emitting records, injected into every
/// payload. Passed in at construction; never resolved from globals.
#[derive(Debug, Clone)]
pub struct ServiceIdentity {
    pub service_uuid: Uuid,
    pub service_name: String,
    pub service_type: String,
    pub node_id: String,
}

/// Error type returned when parsing the log destination URL.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unknown or unsupported log transport scheme: {0:?}")]
    UnknownScheme(String),

    #[error("invalid log destination URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("log destination URL has no host")]
    MissingHost,

    #[error("log destination URL has no port")]
    MissingPort,
}
