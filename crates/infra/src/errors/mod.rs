//! Error conversions for infrastructure adapters

mod conversions;

pub use conversions::{extract_http_error, InfraError};
