//! Authorize and callback orchestration

mod ports;
mod service;

pub use ports::{EphemeralSessionIssuer, ProviderRepository, SessionIssuer};
pub use service::{
    callback_uri_for, login_redirect, AuthorizeRedirect, CallbackOutcome, OidcAuthService,
};
