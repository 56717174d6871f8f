//! Gateway health report served by `GET /health`

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Share of healthy components at or above which the gateway reports healthy.
pub const HEALTHY_SCORE: f64 = 0.8;

/// Aggregated health of the gateway's components.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub is_healthy: bool,
    /// Healthy components over total, 1.0 when nothing is reported
    pub score: f64,
    pub components: Vec<ComponentHealth>,
    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // component counts are tiny
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        let score = if components.is_empty() {
            1.0
        } else {
            let healthy = components.iter().filter(|c| c.is_healthy).count();
            healthy as f64 / components.len() as f64
        };

        Self { is_healthy: score >= HEALTHY_SCORE, score, components, checked_at: Utc::now() }
    }

    /// Look up a component by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentHealth> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// One line of the health report, e.g. `providers` or `state_sweeper`.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: &'static str,
    pub is_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentHealth {
    #[must_use]
    pub const fn up(name: &'static str) -> Self {
        Self { name, is_healthy: true, detail: None }
    }

    #[must_use]
    pub fn up_with(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, is_healthy: true, detail: Some(detail.into()) }
    }

    #[must_use]
    pub fn down(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, is_healthy: false, detail: Some(detail.into()) }
    }
}
