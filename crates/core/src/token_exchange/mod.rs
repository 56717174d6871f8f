//! Authorization code exchange
//!
//! [`TokenExchangeService`] rebuilds the exact callback URL presented to the
//! token endpoint, runs the grant through a [`TokenEndpointClient`] and logs
//! diagnostics on failure. The grant's error is returned unchanged.

mod callback_url;
mod diagnostics;
mod error;
mod ports;
mod service;

pub use callback_url::build_token_request_url;
pub use diagnostics::{issuer_mismatch_hint, malformed_response_checklist};
pub use error::GrantError;
pub use ports::{GrantRequest, TokenEndpointClient};
pub use service::TokenExchangeService;
