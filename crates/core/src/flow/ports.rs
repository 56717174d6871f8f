//! Port interfaces for the sign-in flow
//!
//! Provider configuration and session issuance belong to collaborators
//! outside this crate.

use async_trait::async_trait;
use ssogate_common::generate_nonce;
use ssogate_domain::{OidcProvider, Result};
use tracing::info;

use super::service::CallbackOutcome;

/// Read access to the persisted provider configuration
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    /// Provider by id, `None` if not configured
    async fn provider(&self, id: &str) -> Result<Option<OidcProvider>>;

    /// Origins any provider may redirect back to
    async fn default_allowed_origins(&self) -> Result<Vec<String>>;
}

/// Turns a completed sign-in into an application session token
#[async_trait]
pub trait SessionIssuer: Send + Sync {
    /// Issue a session for `outcome` and return its opaque token
    async fn issue(&self, outcome: &CallbackOutcome) -> Result<String>;
}

/// Mints random opaque tokens without recording anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct EphemeralSessionIssuer;

#[async_trait]
impl SessionIssuer for EphemeralSessionIssuer {
    async fn issue(&self, outcome: &CallbackOutcome) -> Result<String> {
        info!(
            provider_id = %outcome.provider_id,
            subject = outcome.claims.subject().unwrap_or_default(),
            "Issuing ephemeral session"
        );
        Ok(generate_nonce(32))
    }
}
