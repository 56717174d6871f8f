//! Signing primitives for state tokens
//!
//! - [`StateSigner`]: HMAC-SHA256 keyed signer with constant-time verification
//! - [`generate_nonce`]: hex-encoded bytes from the thread-local CSPRNG
//! - [`constant_time_eq`]: byte comparison without early exit

use std::fmt;

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted signing key length in bytes.
pub const MIN_KEY_BYTES: usize = 16;

/// Length of keys produced by [`StateSigner::generate`].
pub const GENERATED_KEY_BYTES: usize = 32;

/// Errors raised by signing primitives
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("signing key must be at least {min} bytes, got {actual}")]
    KeyTooShort { min: usize, actual: usize },

    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

/// HMAC-SHA256 signer holding a process secret
///
/// Signatures are lowercase hex. Verification decodes the candidate and
/// compares MAC tags in constant time.
#[derive(Clone)]
pub struct StateSigner {
    mac: HmacSha256,
}

impl StateSigner {
    /// Build a signer from raw key bytes.
    ///
    /// # Errors
    /// Returns [`CryptoError::KeyTooShort`] for keys under [`MIN_KEY_BYTES`].
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() < MIN_KEY_BYTES {
            return Err(CryptoError::KeyTooShort { min: MIN_KEY_BYTES, actual: key.len() });
        }
        let mac = <HmacSha256 as Mac>::new_from_slice(key)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Build a signer from a configured secret.
    ///
    /// Hex strings decode to their bytes; anything else is used verbatim.
    ///
    /// # Errors
    /// Returns [`CryptoError::KeyTooShort`] when the resulting key is too short.
    pub fn from_secret(secret: &str) -> Result<Self, CryptoError> {
        match hex::decode(secret) {
            Ok(bytes) if bytes.len() >= MIN_KEY_BYTES => Self::new(&bytes),
            _ => Self::new(secret.as_bytes()),
        }
    }

    /// Signer with a fresh random key.
    ///
    /// # Errors
    /// Propagates key construction failures (not expected for HMAC).
    pub fn generate() -> Result<Self, CryptoError> {
        let mut key = vec![0u8; GENERATED_KEY_BYTES];
        rand::thread_rng().fill_bytes(&mut key);
        let signer = Self::new(&key);
        key.zeroize();
        signer
    }

    /// Hex HMAC-SHA256 of `data`.
    #[must_use]
    pub fn sign(&self, data: &[u8]) -> String {
        hex::encode(self.mac(data).finalize().into_bytes())
    }

    /// Check a hex signature against `data` in constant time.
    ///
    /// Malformed hex is simply an invalid signature.
    #[must_use]
    pub fn verify(&self, data: &[u8], signature_hex: &str) -> bool {
        let Ok(candidate) = hex::decode(signature_hex) else {
            return false;
        };
        self.mac(data).verify_slice(&candidate).is_ok()
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac
    }
}

impl fmt::Debug for StateSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateSigner(***)")
    }
}

/// Random hex string from `bytes` random bytes.
#[must_use]
pub fn generate_nonce(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Constant-time comparison to prevent timing attacks
///
/// Length mismatch returns early; only content comparison is constant-time.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
