//! Field validation primitives.
//!
//! [`FieldValidator`] is the small trait every validator implements;
//! [`UrlValidator`] checks scheme/host constraints and the issuer module
//! guards OIDC issuer URLs against trailing-slash misconfiguration before
//! any discovery request is made.

mod issuer;
mod validators;

pub use issuer::{
    is_valid_issuer_url, IssuerUrlValidator, INVALID_ISSUER_EXAMPLES, ISSUER_URL_PATTERN,
    ISSUER_URL_REGEX, VALID_ISSUER_EXAMPLES,
};
pub use validators::{FieldValidator, UrlValidator};
