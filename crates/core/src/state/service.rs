//! State token issuing and validation

use std::sync::Arc;

use ssogate_common::{generate_nonce, StateSigner};
use ssogate_domain::constants::STATE_NONCE_BYTES;
use tracing::{debug, warn};

use super::store::{SecureStateRecord, StateStore};
use super::StateError;

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedState {
    pub provider_id: String,
    pub client_state: String,
    pub redirect_uri: Option<String>,
}

/// Provider id and client state recovered from an unsigned legacy token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyState {
    pub provider_id: String,
    pub original_state: String,
}

/// Issues and validates signed state tokens.
///
/// The store is shared with [`super::StateSweeper`]; the service itself is
/// cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct SecureStateService {
    signer: StateSigner,
    store: Arc<StateStore>,
}

struct ParsedToken<'a> {
    provider_id: &'a str,
    nonce: &'a str,
    timestamp: &'a str,
    timestamp_ms: u64,
    signature: &'a str,
}

impl SecureStateService {
    pub fn new(signer: StateSigner, store: Arc<StateStore>) -> Self {
        Self { signer, store }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Mint a token for `provider_id` and remember the client state and
    /// redirect URI until it is validated or expires.
    pub fn generate_secure_state(
        &self,
        provider_id: &str,
        client_state: &str,
        redirect_uri: Option<&str>,
    ) -> String {
        let nonce = generate_nonce(STATE_NONCE_BYTES);
        let timestamp_ms = self.store.now_ms();
        let payload = signed_payload(provider_id, &nonce, &timestamp_ms.to_string());
        let signature = self.signer.sign(payload.as_bytes());
        let token = format!("{provider_id}:{nonce}.{timestamp_ms}.{signature}");

        self.store.insert(
            token.clone(),
            SecureStateRecord {
                provider_id: provider_id.to_string(),
                client_state: client_state.to_string(),
                redirect_uri: redirect_uri.map(str::to_string),
                created_at_ms: timestamp_ms,
            },
        );
        debug!(provider_id, outstanding = self.store.len(), "Issued state token");
        token
    }

    /// Check `token` for `expected_provider_id` and consume it.
    ///
    /// # Errors
    /// Returns the first failing check as a [`StateError`].
    pub fn validate_secure_state(
        &self,
        token: &str,
        expected_provider_id: &str,
    ) -> Result<ValidatedState, StateError> {
        let parsed = parse_token(token).ok_or(StateError::InvalidFormat)?;

        if parsed.provider_id != expected_provider_id {
            warn!(
                expected_provider_id,
                state_provider_id = parsed.provider_id,
                "State provider mismatch"
            );
            return Err(StateError::ProviderMismatch);
        }

        let payload = signed_payload(parsed.provider_id, parsed.nonce, parsed.timestamp);
        if !self.signer.verify(payload.as_bytes(), parsed.signature) {
            warn!(provider_id = parsed.provider_id, "State signature verification failed");
            return Err(StateError::InvalidSignature);
        }

        let ttl_ms = u64::try_from(self.store.ttl().as_millis()).unwrap_or(u64::MAX);
        let age_ms = self.store.now_ms().saturating_sub(parsed.timestamp_ms);
        if age_ms > ttl_ms {
            self.store.remove(token);
            debug!(provider_id = parsed.provider_id, age_ms, "State token expired");
            return Err(StateError::Expired);
        }

        let Some(record) = self.store.take(token) else {
            warn!(provider_id = parsed.provider_id, "State token unknown or replayed");
            return Err(StateError::NotFoundOrUsed);
        };

        debug!(provider_id = parsed.provider_id, "State token consumed");
        Ok(ValidatedState {
            provider_id: record.provider_id,
            client_state: record.client_state,
            redirect_uri: record.redirect_uri,
        })
    }

    /// Drop expired records. Called by the sweeper.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }
}

fn signed_payload(provider_id: &str, nonce: &str, timestamp: &str) -> String {
    format!("{provider_id}.{nonce}.{timestamp}")
}

fn parse_token(token: &str) -> Option<ParsedToken<'_>> {
    let (provider_id, payload) = token.split_once(':')?;
    let mut parts = payload.split('.');
    let (nonce, timestamp, signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || [nonce, timestamp, signature].iter().any(|p| p.is_empty()) {
        return None;
    }
    let timestamp_ms = timestamp.parse().ok()?;
    Some(ParsedToken { provider_id, nonce, timestamp, timestamp_ms, signature })
}

/// Provider id embedded before the first `:`, if any.
#[must_use]
pub fn extract_provider_from_state(token: &str) -> Option<&str> {
    token.split_once(':').map(|(provider_id, _)| provider_id)
}

/// Parse the unsigned `providerId:clientState` format.
///
/// Signed tokens (three dot-separated segments) and tokens without a
/// provider prefix yield an empty provider id and the whole input.
#[must_use]
pub fn extract_provider_from_legacy_state(token: &str) -> LegacyState {
    let unparsed = || LegacyState { provider_id: String::new(), original_state: token.to_string() };

    if token.split('.').count() == 3 {
        return unparsed();
    }
    match token.split_once(':') {
        Some((provider_id, original_state)) if !provider_id.is_empty() => LegacyState {
            provider_id: provider_id.to_string(),
            original_state: original_state.to_string(),
        },
        _ => unparsed(),
    }
}
