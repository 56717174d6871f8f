//! Identity provider configuration
//!
//! One `OidcProvider` describes an upstream OpenID Connect identity provider.
//! Records are created by administrative configuration and treated as
//! immutable for the duration of an authorize/callback flow.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::secret::SecretString;
use crate::constants::DEFAULT_SCOPES;

/// Configuration for one identity provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcProvider {
    /// Stable identifier, used in routes and embedded in state tokens
    pub id: String,

    /// Human readable name
    pub name: String,

    /// OAuth client id registered with the provider
    pub client_id: String,

    /// Client secret; public clients leave this unset
    #[serde(default)]
    pub client_secret: Option<SecretString>,

    /// Issuer URL without trailing slash
    #[serde(default)]
    pub issuer: Option<String>,

    /// Explicit authorization endpoint (otherwise discovered)
    #[serde(default)]
    pub authorization_endpoint: Option<String>,

    /// Explicit token endpoint (otherwise discovered)
    #[serde(default)]
    pub token_endpoint: Option<String>,

    /// Explicit JWKS URI (otherwise discovered)
    #[serde(default)]
    pub jwks_uri: Option<String>,

    /// Requested scopes, in order
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Claim rules a user must satisfy after login
    #[serde(default)]
    pub authorization_rules: Vec<AuthorizationRule>,

    /// How `authorization_rules` combine
    #[serde(default)]
    pub authorization_rule_mode: AuthorizationRuleMode,

    /// Extra query parameters appended to the authorization URL
    #[serde(default)]
    pub custom_auth_params: BTreeMap<String, String>,

    // Display customization, passed through to the login UI untouched.
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub button_icon: Option<String>,
    #[serde(default)]
    pub button_variant: Option<String>,
    #[serde(default)]
    pub button_style: Option<String>,
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect()
}

impl OidcProvider {
    /// Minimal provider with default scopes and no rules.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        client_id: impl Into<String>,
        issuer: Option<String>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            client_id: client_id.into(),
            client_secret: None,
            issuer,
            authorization_endpoint: None,
            token_endpoint: None,
            jwks_uri: None,
            scopes: default_scopes(),
            authorization_rules: Vec::new(),
            authorization_rule_mode: AuthorizationRuleMode::default(),
            custom_auth_params: BTreeMap::new(),
            button_text: None,
            button_icon: None,
            button_variant: None,
            button_style: None,
        }
    }

    /// Scopes joined for the `scope` query parameter.
    #[must_use]
    pub fn scope_string(&self) -> String {
        if self.scopes.is_empty() {
            default_scopes().join(" ")
        } else {
            self.scopes.join(" ")
        }
    }

    /// Whether the provider carries a usable client secret.
    #[must_use]
    pub fn has_client_secret(&self) -> bool {
        self.client_secret.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Whether both endpoints are configured so discovery can be skipped.
    #[must_use]
    pub fn has_explicit_endpoints(&self) -> bool {
        self.authorization_endpoint.is_some() && self.token_endpoint.is_some()
    }
}

/// A single claim/operator/values check
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRule {
    /// Claim name in the ID token (e.g. `email`, `groups`)
    pub claim: String,
    pub operator: RuleOperator,
    /// Accepted values; any match satisfies the rule
    pub value: Vec<String>,
}

/// Comparison applied between a claim value and a rule value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOperator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

/// How multiple authorization rules combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthorizationRuleMode {
    #[default]
    Or,
    And,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_provider() {
        let json = r#"{
            "id": "google",
            "name": "Google",
            "clientId": "abc",
            "clientSecret": "shh",
            "issuer": "https://accounts.google.com",
            "authorizationRules": [
                {"claim": "email", "operator": "endsWith", "value": ["@example.com"]}
            ],
            "authorizationRuleMode": "AND",
            "customAuthParams": {"prompt": "select_account"}
        }"#;

        let provider: OidcProvider = serde_json::from_str(json).unwrap();
        assert_eq!(provider.client_id, "abc");
        assert!(provider.has_client_secret());
        assert_eq!(provider.scopes, vec!["openid", "profile", "email"]);
        assert_eq!(provider.authorization_rule_mode, AuthorizationRuleMode::And);
        assert_eq!(provider.authorization_rules[0].operator, RuleOperator::EndsWith);
        assert_eq!(provider.custom_auth_params.get("prompt").map(String::as_str), Some("select_account"));
        assert!(!format!("{provider:?}").contains("shh"));
    }

    #[test]
    fn rule_mode_defaults_to_or() {
        let provider = OidcProvider::new("p1", "client", None);
        assert_eq!(provider.authorization_rule_mode, AuthorizationRuleMode::Or);
        assert_eq!(provider.scope_string(), "openid profile email");
        assert!(!provider.has_explicit_endpoints());
    }
}
