//! Port for the token endpoint

use async_trait::async_trait;
use ssogate_domain::{SecretString, TokenResponse};

use super::error::GrantError;
use crate::discovery::ClientAuthMethod;

/// Everything an adapter needs to run one authorization code grant.
#[derive(Debug, Clone)]
pub struct GrantRequest {
    pub token_endpoint: String,
    /// Callback URL with `code`, `state` and auxiliary parameters applied
    pub callback_url: String,
    /// `redirect_uri` form value; byte-identical to the authorize request
    pub redirect_uri: String,
    pub expected_state: String,
    /// Issuer the `iss` parameter and ID token must carry, if known
    pub expected_issuer: Option<String>,
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub auth_method: ClientAuthMethod,
    /// Set only for plain HTTP issuers, for this request alone
    pub allow_insecure: bool,
}

/// Executes the authorization code grant.
#[async_trait]
pub trait TokenEndpointClient: Send + Sync {
    /// Check the callback parameters, post the code and return the tokens.
    async fn authorization_code_grant(
        &self,
        request: &GrantRequest,
    ) -> Result<TokenResponse, GrantError>;
}
