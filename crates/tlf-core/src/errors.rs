use std::time::Duration;

/// Core error type for the forwarder.
///
/// Adapter crates should map their specific errors into this type so the
/// core can handle failures consistently (startup failure vs. best-effort
/// delivery failure).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
