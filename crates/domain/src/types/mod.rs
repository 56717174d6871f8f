//! Domain types and models

pub mod extracted_error;
pub mod provider;
pub mod redirect;
pub mod secret;
pub mod token;

pub use extracted_error::ExtractedError;
pub use provider::{AuthorizationRule, AuthorizationRuleMode, OidcProvider, RuleOperator};
pub use redirect::RedirectValidationResult;
pub use secret::SecretString;
pub use token::{TokenResponse, TokenSet};
