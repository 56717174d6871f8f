//! Error types used throughout the gateway

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for ssogate
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SsoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Provider configuration error: {0}")]
    Discovery(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SsoError {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::State(_) => "state",
            Self::Discovery(_) => "discovery",
            Self::TokenExchange(_) => "token_exchange",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Network(_) => "network",
            Self::Internal(_) => "internal",
        }
    }

    /// The message without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Config(m)
            | Self::InvalidInput(m)
            | Self::State(m)
            | Self::Discovery(m)
            | Self::TokenExchange(m)
            | Self::Unauthorized(m)
            | Self::NotFound(m)
            | Self::Network(m)
            | Self::Internal(m) => m,
        }
    }
}

/// Result type alias for ssogate operations
pub type Result<T> = std::result::Result<T, SsoError>;
