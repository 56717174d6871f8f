//! # ssogate API
//!
//! HTTP application layer - routes, wiring and the binary entry point.
//!
//! This crate contains:
//! - axum routes for the authorize and callback legs of the sign-in flow
//! - Application context (dependency injection)
//! - Logging bootstrap and health reporting
//!
//! ## Architecture
//! - Depends on `domain`, `common`, `core`, and `infra`
//! - Wires the reqwest adapters into the core services

pub mod context;
pub mod routes;
pub mod utils;

// Re-export for convenience
pub use context::{Adapters, AppContext};
pub use routes::{create_router, ApiError};
