//! Normalized diagnostics for discovery and token endpoint failures
//!
//! HTTP clients surface failures in many shapes: transport errors with nested
//! causes, non-2xx responses, OAuth error documents, unparseable bodies. An
//! `ExtractedError` flattens all of them into one record that classification
//! and logging can inspect. It is built once per failure and never persisted.

use std::collections::BTreeMap;
use std::error::Error as StdError;

use serde::Serialize;
use thiserror::Error;

use crate::constants::{MAX_CAUSE_DEPTH, MAX_DIAGNOSTIC_BODY_CHARS};

/// Flattened view of a failed outbound call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ExtractedError {
    pub message: String,

    /// Error type (Rust type name or adapter-assigned category)
    #[serde(rename = "type")]
    pub kind: String,

    /// Machine code such as `ECONNREFUSED`-style hints or an adapter code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_headers: Vec<(String, String)>,

    /// OAuth `error` field from an error response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// OAuth `error_description` field from an error response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// Messages of nested causes, outermost first, bounded depth
    pub cause_chain: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_properties: BTreeMap<String, String>,
}

impl ExtractedError {
    /// Start from a bare message.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(), message: message.into(), ..Self::default() }
    }

    /// Capture an error and up to `MAX_CAUSE_DEPTH` of its sources.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: StdError + 'static,
    {
        let mut cause_chain = Vec::new();
        let mut current = err.source();
        while let Some(cause) = current {
            if cause_chain.len() >= MAX_CAUSE_DEPTH {
                break;
            }
            cause_chain.push(cause.to_string());
            current = cause.source();
        }

        Self {
            message: err.to_string(),
            kind: short_type_name::<E>().to_string(),
            cause_chain,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: u16, status_text: Option<String>) -> Self {
        self.status = Some(status);
        self.status_text = status_text;
        self
    }

    /// Keep the response body, truncated to `MAX_DIAGNOSTIC_BODY_CHARS`.
    #[must_use]
    pub fn with_response_body(mut self, body: &str) -> Self {
        let truncated: String = body.chars().take(MAX_DIAGNOSTIC_BODY_CHARS).collect();
        self.response_body = Some(truncated);
        self
    }

    #[must_use]
    pub fn with_response_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.response_headers = headers;
        self
    }

    #[must_use]
    pub fn with_oauth_error(mut self, error: impl Into<String>, description: Option<String>) -> Self {
        self.error = Some(error.into());
        self.error_description = description;
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_properties.insert(key.into(), value.into());
        self
    }

    /// Value of a response header, case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Lowercased concatenation of every textual field, for pattern matching.
    #[must_use]
    pub fn diagnostic_text(&self) -> String {
        let mut parts: Vec<&str> = vec![self.message.as_str(), self.kind.as_str()];
        parts.extend(self.code.as_deref());
        parts.extend(self.status_text.as_deref());
        parts.extend(self.error.as_deref());
        parts.extend(self.error_description.as_deref());
        parts.extend(self.cause_chain.iter().map(String::as_str));
        parts.join(" | ").to_lowercase()
    }
}

fn short_type_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    // Keep generic arguments intact: only trim the path before the base name.
    let base_end = full.find('<').unwrap_or(full.len());
    let start = full[..base_end].rfind("::").map_or(0, |idx| idx + 2);
    &full[start..]
}
