//! Modular common utilities shared across ssogate crates.
//!
//! - [`crypto`]: HMAC-SHA256 signing, nonce generation, constant-time compare
//! - [`time`]: wall-clock abstraction with a controllable mock for tests
//! - [`validation`]: field validators, including the OIDC issuer URL check

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod crypto;
pub mod time;
pub mod validation;

// Re-export commonly used types and traits for convenience
pub use crypto::{constant_time_eq, generate_nonce, CryptoError, StateSigner};
pub use time::{Clock, MockClock, SystemClock};
pub use validation::{
    is_valid_issuer_url, FieldValidator, IssuerUrlValidator, UrlValidator, ISSUER_URL_PATTERN,
};
