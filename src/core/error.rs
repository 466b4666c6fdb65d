use std::io;
use thiserror::Error;

/// Unified error type for the shopchat client
#[derive(Error, Debug)]
pub enum ShopError {
    /// The backend answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// A background mutation task panicked or was aborted
    #[error("Background task error: {0}")]
    Task(String),
}

impl ShopError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ShopError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ShopError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ShopError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ShopError::Network(format!("Connection failed: {}", err))
        } else if let Some(status) = err.status() {
            ShopError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            ShopError::Serialization(format!("Response body: {}", err))
        } else {
            ShopError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for ShopError {
    fn from(err: serde_yml::Error) -> Self {
        ShopError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<tokio::task::JoinError> for ShopError {
    fn from(err: tokio::task::JoinError) -> Self {
        ShopError::Task(err.to_string())
    }
}
