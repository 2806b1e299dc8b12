//! Error types for the NymphCast remote controller.

use thiserror::Error;

/// Primary error type for controller setup and discovery operations.
///
/// Per-command failures (resolution, connection, cast) are returned as
/// values to the immediate caller and only lifted into this type where a
/// `Result` chain needs them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionFailure),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Failure to turn a content reference into a castable path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Unsupported document authority: {0}")]
    UnsupportedAuthority(String),

    #[error("Unsupported storage volume: {0}")]
    UnsupportedVolume(String),

    #[error("No row found for content reference")]
    NotFound,

    #[error("Malformed document id: {0}")]
    MalformedDocumentId(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Content provider failed: {0}")]
    Provider(String),
}

/// A connect attempt that did not end in `Connected`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Connection failed: {reason}")]
pub struct ConnectionFailure {
    pub reason: String,
}

impl ConnectionFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors on the application message channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("No remote is connected")]
    NotConnected,
}

/// Errors while waiting for a discovery round.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("Discovery round was dropped by the transport without a result")]
    Abandoned,

    #[error("Discovery timed out")]
    Timeout,
}

/// Errors while loading configuration or assembling the controller.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing component: {0}")]
    MissingComponent(&'static str),
}

/// Parsing errors for content references.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Invalid encoding in URI path: {0}")]
    InvalidEncoding(String),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;
