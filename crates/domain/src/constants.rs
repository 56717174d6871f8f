//! Domain constants
//!
//! Centralized location for the values shared by the authorize and callback
//! flows.

use std::time::Duration;

/// Lifetime of a signed state token.
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// How often abandoned state records are swept from memory.
pub const STATE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Number of random bytes in a state nonce (hex encoded to twice as many chars).
pub const STATE_NONCE_BYTES: usize = 32;

/// Server callback path registered with every identity provider.
pub const CALLBACK_PATH: &str = "/graphql/api/auth/oidc/callback";

/// Prefix of the authorize route; the provider id follows.
pub const AUTHORIZE_PATH_PREFIX: &str = "/graphql/api/auth/oidc/authorize";

/// Path appended to the issuer to locate the discovery document.
pub const WELL_KNOWN_PATH: &str = "/.well-known/openid-configuration";

/// Scopes requested when a provider does not configure any.
pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email"];

/// Protocol assumed when neither proxy headers nor the request carry one.
pub const DEFAULT_PROTOCOL: &str = "http";

/// Host assumed when neither proxy headers nor the request carry one.
pub const DEFAULT_HOST: &str = "localhost:3000";

/// Maximum number of nested causes captured in an `ExtractedError`.
pub const MAX_CAUSE_DEPTH: usize = 5;

/// Maximum number of characters of a response body kept for diagnostics.
pub const MAX_DIAGNOSTIC_BODY_CHARS: usize = 2048;

/// Auxiliary callback parameters copied onto the reconstructed callback URL.
pub const PRESERVED_CALLBACK_PARAMS: &[&str] =
    &["scope", "authuser", "prompt", "hd", "session_state", "iss"];
