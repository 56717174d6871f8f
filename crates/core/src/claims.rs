//! ID token claim decoding and validation
//!
//! The ID token is received directly from the token endpoint over TLS, so
//! its signature is not verified here (OpenID Connect Core 3.1.3.7). The
//! issuer, audience and expiry claims are still checked.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::token_exchange::GrantError;

/// Decoded ID token payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IdTokenClaims(Map<String, Value>);

impl IdTokenClaims {
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get("iss").and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.get("email").and_then(Value::as_str)
    }

    /// `aud` as a list, whether it was a string or an array.
    pub fn audiences(&self) -> Vec<&str> {
        match self.get("aud") {
            Some(Value::String(aud)) => vec![aud.as_str()],
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// `exp` in seconds since the epoch.
    pub fn expires_at(&self) -> Option<i64> {
        self.get("exp").and_then(Value::as_i64)
    }

    /// Every value of `claim` rendered as a string; arrays are flattened.
    ///
    /// Objects and nulls yield nothing.
    pub fn values(&self, claim: &str) -> Vec<String> {
        fn render(value: &Value) -> Option<String> {
            match value {
                Value::String(s) => Some(s.clone()),
                Value::Bool(b) => Some(b.to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        }

        match self.get(claim) {
            Some(Value::Array(items)) => items.iter().filter_map(render).collect(),
            Some(value) => render(value).into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for IdTokenClaims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Decode the payload segment of a compact JWT.
///
/// # Errors
/// [`GrantError::InvalidIdToken`] for a malformed token or non-object payload.
pub fn decode_id_token_claims(id_token: &str) -> Result<IdTokenClaims, GrantError> {
    let mut segments = id_token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(GrantError::InvalidIdToken("expected three dot-separated segments".into())),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| GrantError::InvalidIdToken(format!("payload is not base64url: {e}")))?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(IdTokenClaims(map)),
        Ok(_) => Err(GrantError::InvalidIdToken("payload is not a JSON object".into())),
        Err(e) => Err(GrantError::InvalidIdToken(format!("payload is not JSON: {e}"))),
    }
}

/// Check `iss`, `aud` and `exp`.
///
/// `expected_issuer` of `None` skips the issuer check (explicit endpoint
/// providers without an issuer).
///
/// # Errors
/// [`GrantError::UnexpectedClaim`] naming the first claim that failed.
pub fn validate_id_token_claims(
    claims: &IdTokenClaims,
    expected_issuer: Option<&str>,
    client_id: &str,
    now_secs: i64,
) -> Result<(), GrantError> {
    let unexpected = |claim: &str, expected: String, actual: String| GrantError::UnexpectedClaim {
        claim: claim.to_string(),
        expected,
        actual,
    };

    if let Some(expected) = expected_issuer {
        let actual = claims.issuer().unwrap_or_default();
        if actual != expected {
            return Err(unexpected("iss", expected.to_string(), actual.to_string()));
        }
    }

    let audiences = claims.audiences();
    if !audiences.contains(&client_id) {
        return Err(unexpected("aud", client_id.to_string(), audiences.join(",")));
    }

    if let Some(exp) = claims.expires_at() {
        if exp <= now_secs {
            return Err(unexpected("exp", format!("> {now_secs}"), exp.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn jwt(payload: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_decode_and_accessors() {
        let token = jwt(&json!({
            "iss": "https://idp.example.com",
            "sub": "user-1",
            "aud": ["client-1", "other"],
            "exp": 2_000_000_000,
            "email": "admin@example.com",
            "groups": ["admins", "users"],
            "email_verified": true
        }));
        let claims = decode_id_token_claims(&token).unwrap();
        assert_eq!(claims.issuer(), Some("https://idp.example.com"));
        assert_eq!(claims.subject(), Some("user-1"));
        assert_eq!(claims.audiences(), vec!["client-1", "other"]);
        assert_eq!(claims.values("groups"), vec!["admins", "users"]);
        assert_eq!(claims.values("email_verified"), vec!["true"]);
        assert!(claims.values("missing").is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode_id_token_claims("only.two").is_err());
        assert!(decode_id_token_claims("a.!!!.c").is_err());
        let array_payload = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"[1,2]"));
        assert!(decode_id_token_claims(&array_payload).is_err());
    }

    #[test]
    fn test_validate_claims() {
        let claims = decode_id_token_claims(&jwt(&json!({
            "iss": "https://idp.example.com",
            "aud": "client-1",
            "exp": 1_000
        })))
        .unwrap();

        assert!(validate_id_token_claims(&claims, Some("https://idp.example.com"), "client-1", 999).is_ok());
        assert!(validate_id_token_claims(&claims, None, "client-1", 999).is_ok());

        let err = validate_id_token_claims(&claims, Some("https://idp.example.com/"), "client-1", 999)
            .unwrap_err();
        assert!(matches!(err, GrantError::UnexpectedClaim { ref claim, .. } if claim == "iss"));

        let err = validate_id_token_claims(&claims, None, "client-2", 999).unwrap_err();
        assert!(matches!(err, GrantError::UnexpectedClaim { ref claim, .. } if claim == "aud"));

        let err = validate_id_token_claims(&claims, None, "client-1", 1_000).unwrap_err();
        assert!(matches!(err, GrantError::UnexpectedClaim { ref claim, .. } if claim == "exp"));
    }
}
