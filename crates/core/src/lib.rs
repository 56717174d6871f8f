//! # ssogate Core
//!
//! OIDC single sign-on logic with no HTTP client or server code.
//!
//! This crate contains:
//! - Redirect URI validation against open-redirect and downgrade attacks
//! - Signed, single-use state tokens with a background expiry sweep
//! - Request origin extraction and parameter validation
//! - Provider discovery, failure classification and configuration caching
//! - Authorization code exchange orchestration with diagnostics
//! - ID token claim checks and authorization rule evaluation
//! - The `OidcAuthService` orchestrating authorize and callback
//!
//! ## Architecture Principles
//! - Only depends on `ssogate-common` and `ssogate-domain`
//! - Network and persistence reach this crate through port traits
//! - Expected failures are returned as typed errors, never panics

pub mod authorization;
pub mod claims;
pub mod discovery;
pub mod flow;
pub mod redirect;
pub mod request;
pub mod state;
pub mod token_exchange;

pub use authorization::{evaluate_rules, AuthorizationDecision};
pub use claims::{decode_id_token_claims, validate_id_token_claims, IdTokenClaims};
pub use discovery::{
    build_well_known_url, ClientAuthMethod, DiscoveryClient, DiscoveryError, DiscoveryErrorKind,
    DiscoveryService, ProviderConfiguration, ProviderMetadata, ProviderValidation,
};
pub use flow::{
    AuthorizeRedirect, CallbackOutcome, EphemeralSessionIssuer, OidcAuthService,
    ProviderRepository, SessionIssuer,
};
pub use redirect::validate_redirect_uri;
pub use request::{
    extract_request_info, validate_authorize_params, validate_callback_params, AuthorizeParams,
    CallbackParams, InboundRequest, RequestError, RequestInfo,
};
pub use state::{
    extract_provider_from_legacy_state, extract_provider_from_state, LegacyState,
    SecureStateRecord, SecureStateService, StateError, StateStore, StateSweeper, SweeperError,
    ValidatedState,
};
pub use token_exchange::{
    build_token_request_url, GrantError, GrantRequest, TokenEndpointClient, TokenExchangeService,
};
