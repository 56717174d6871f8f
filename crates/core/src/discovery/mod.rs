//! OIDC discovery and provider validation
//!
//! - [`DiscoveryClient`]: port performing the HTTP fetch of the discovery document
//! - [`DiscoveryService`]: preflight, document validation, classification, caching
//! - [`classify`]: maps heterogeneous transport errors onto [`DiscoveryErrorKind`]

mod cache;
pub mod classify;
mod config;
mod error;
mod ports;
mod service;

pub use cache::{DiscoveryCache, DiscoveryCacheConfig};
pub use classify::classify_error;
pub use config::{ClientAuthMethod, ProviderConfiguration};
pub use error::{DiscoveryError, DiscoveryErrorKind};
pub use ports::{DiscoveryClient, ProviderMetadata};
pub use service::{build_well_known_url, DiscoveryService, ProviderValidation};
