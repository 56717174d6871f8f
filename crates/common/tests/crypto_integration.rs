//! Integration tests for crypto module
//!
//! Validates signer construction from configured secrets, cross-instance
//! verification, and nonce uniqueness across many draws.

use std::collections::HashSet;

use ssogate_common::crypto::MIN_KEY_BYTES;
use ssogate_common::{constant_time_eq, generate_nonce, CryptoError, StateSigner};
use ssogate_domain::SecretString;

/// Two signers built from the same configured secret agree on signatures,
/// which is what lets a restarted process keep honouring in-flight tokens.
#[test]
fn signers_from_same_secret_verify_each_other() {
    let secret = SecretString::from("0123456789abcdef0123456789abcdef");
    let a = StateSigner::from_secret(secret.expose()).expect("hex secret should be accepted");
    let b = StateSigner::from_secret(secret.expose()).expect("hex secret should be accepted");

    let payload = b"okta.deadbeef.1700000000000";
    let signature = a.sign(payload);

    assert_eq!(signature.len(), 64, "HMAC-SHA256 hex digest is 64 chars");
    assert!(b.verify(payload, &signature));
    assert!(!b.verify(b"okta.deadbeef.1700000000001", &signature));
}

/// Passphrase secrets that are not hex are used as raw key bytes.
#[test]
fn passphrase_secret_is_used_verbatim() {
    let signer = StateSigner::from_secret("correct horse battery staple")
        .expect("long passphrase should be accepted");
    let raw = StateSigner::new(b"correct horse battery staple").expect("raw key should be accepted");

    let signature = signer.sign(b"payload");
    assert!(raw.verify(b"payload", &signature));
}

/// Short secrets are refused with the configured minimum.
#[test]
fn short_secret_is_rejected() {
    let err = StateSigner::from_secret("short").unwrap_err();
    assert_eq!(err, CryptoError::KeyTooShort { min: MIN_KEY_BYTES, actual: 5 });
}

/// Malformed signatures never verify, regardless of shape.
#[test]
fn malformed_signatures_fail_verification() {
    let signer = StateSigner::generate().expect("random key");
    let good = signer.sign(b"payload");

    assert!(!signer.verify(b"payload", ""));
    assert!(!signer.verify(b"payload", "not-hex"));
    assert!(!signer.verify(b"payload", &good[..good.len() - 2]));
}

/// Nonces do not repeat across a large number of draws.
#[test]
fn nonces_are_unique() {
    let nonces: HashSet<String> = (0..1_000).map(|_| generate_nonce(32)).collect();
    assert_eq!(nonces.len(), 1_000);
    assert!(nonces.iter().all(|n| n.len() == 64));
}

#[test]
fn constant_time_eq_matches_plain_equality() {
    assert!(constant_time_eq(b"", b""));
    assert!(constant_time_eq(b"abc", b"abc"));
    assert!(!constant_time_eq(b"abc", b"abd"));
    assert!(!constant_time_eq(b"abc", b"abcd"));
}
