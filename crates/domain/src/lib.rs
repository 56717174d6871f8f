//! # ssogate Domain
//!
//! Domain types and models for the OIDC single sign-on gateway.
//!
//! This crate contains:
//! - Provider configuration (`OidcProvider`, authorization rules)
//! - Flow data (`RedirectValidationResult`, token responses)
//! - Normalized diagnostics (`ExtractedError`)
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other ssogate crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
