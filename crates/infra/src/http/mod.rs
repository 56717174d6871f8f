//! HTTP adapters for discovery and the token endpoint

pub mod client;
pub mod discovery;
pub mod token;

pub use client::{transport_allowed, HttpClient, HttpClientBuilder};
pub use discovery::ReqwestDiscoveryClient;
pub use token::ReqwestTokenClient;
