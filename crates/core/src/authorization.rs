//! Claim-based authorization rules
//!
//! A provider without rules denies every login.

use ssogate_domain::{AuthorizationRule, AuthorizationRuleMode, OidcProvider, RuleOperator};
use tracing::{debug, warn};

use crate::claims::IdTokenClaims;

/// Outcome of evaluating a provider's rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Allowed,
    Denied(String),
}

impl AuthorizationDecision {
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Evaluate `provider`'s rules against `claims`.
pub fn evaluate_rules(provider: &OidcProvider, claims: &IdTokenClaims) -> AuthorizationDecision {
    let rules = &provider.authorization_rules;
    if rules.is_empty() {
        warn!(provider_id = %provider.id, "No authorization rules configured; denying login");
        return AuthorizationDecision::Denied(format!(
            "No authorization rules configured for provider {}",
            provider.id
        ));
    }

    let allowed = match provider.authorization_rule_mode {
        AuthorizationRuleMode::Or => rules.iter().any(|rule| rule_matches(rule, claims)),
        AuthorizationRuleMode::And => rules.iter().all(|rule| rule_matches(rule, claims)),
    };

    if allowed {
        debug!(provider_id = %provider.id, "Authorization rules satisfied");
        AuthorizationDecision::Allowed
    } else {
        warn!(
            provider_id = %provider.id,
            subject = claims.subject().unwrap_or_default(),
            mode = ?provider.authorization_rule_mode,
            "Authorization rules not satisfied"
        );
        AuthorizationDecision::Denied("Access denied by authorization rules".to_string())
    }
}

fn rule_matches(rule: &AuthorizationRule, claims: &IdTokenClaims) -> bool {
    let actual = claims.values(&rule.claim);
    actual.iter().any(|claim_value| {
        rule.value.iter().any(|expected| operator_matches(rule.operator, claim_value, expected))
    })
}

fn operator_matches(operator: RuleOperator, claim_value: &str, expected: &str) -> bool {
    match operator {
        RuleOperator::Equals => claim_value == expected,
        RuleOperator::Contains => claim_value.contains(expected),
        RuleOperator::StartsWith => claim_value.starts_with(expected),
        RuleOperator::EndsWith => claim_value.ends_with(expected),
    }
}
