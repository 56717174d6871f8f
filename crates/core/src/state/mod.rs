//! Signed, single-use state tokens
//!
//! Tokens have the shape `{provider_id}:{nonce}.{timestamp_ms}.{signature}`
//! where the signature is HMAC-SHA256 over `{provider_id}.{nonce}.{timestamp_ms}`.
//! Each issued token has a record in the [`StateStore`]; validation removes
//! it, so a token is accepted at most once.

mod service;
mod store;
mod sweeper;

use ssogate_domain::SsoError;
use thiserror::Error;

pub use service::{
    extract_provider_from_legacy_state, extract_provider_from_state, LegacyState,
    SecureStateService, ValidatedState,
};
pub use store::{SecureStateRecord, StateStore};
pub use sweeper::{StateSweeper, SweeperError};

/// Reasons a state token is rejected, in the order they are checked.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("Invalid state format")]
    InvalidFormat,

    #[error("Provider ID mismatch in state")]
    ProviderMismatch,

    #[error("Invalid state signature")]
    InvalidSignature,

    #[error("State token has expired")]
    Expired,

    #[error("State token not found or already used")]
    NotFoundOrUsed,
}

impl StateError {
    /// Stable label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid_format",
            Self::ProviderMismatch => "provider_mismatch",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::NotFoundOrUsed => "not_found_or_used",
        }
    }
}

impl From<StateError> for SsoError {
    fn from(err: StateError) -> Self {
        Self::State(err.to_string())
    }
}
