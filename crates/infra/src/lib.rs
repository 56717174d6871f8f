//! # ssogate Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest HTTP client and its discovery/token endpoint adapters
//! - Configuration loading (file + environment)
//! - The in-memory provider repository
//!
//! ## Architecture
//! - Implements traits defined in `ssogate-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod providers;

// Re-export commonly used items
pub use errors::{extract_http_error, InfraError};
pub use http::{HttpClient, HttpClientBuilder, ReqwestDiscoveryClient, ReqwestTokenClient};
pub use providers::StaticProviderRepository;
