//! Error types for the radar

use thiserror::Error;

/// Radar-wide error type
#[derive(Error, Debug)]
pub enum RadarError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RadarError {
    pub fn api(msg: impl Into<String>) -> Self {
        RadarError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        RadarError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        RadarError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        RadarError::NotFound(msg.into())
    }

    pub fn timeout(secs: u64) -> Self {
        RadarError::Timeout(secs)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        RadarError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        RadarError::Internal(msg.into())
    }
}

/// Result type alias for radar operations
pub type RadarResult<T> = Result<T, RadarError>;
