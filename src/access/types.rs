use serde::{Deserialize, Serialize};

use crate::db::models::PlanTier;

/// Sentinel for "no counter applies" in decisions and quota tables.
pub const UNLIMITED: i64 = -1;

/// Who is asking for playback. Anonymous visitors are identified only by a
/// low-entropy device fingerprint; collisions are acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated { user_id: String },
    Anonymous { fingerprint: String },
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated { .. })
    }
}

/// Outcome of an entitlement check for one tour. `remaining`/`max` of -1
/// mean unlimited; they are omitted entirely when a profile is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl AccessDecision {
    pub fn allow(remaining: i64, max: i64) -> Self {
        Self {
            allowed: true,
            reason: None,
            remaining: Some(remaining),
            max: Some(max),
        }
    }

    pub fn allow_unlimited() -> Self {
        Self::allow(UNLIMITED, UNLIMITED)
    }

    pub fn deny(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
            remaining: None,
            max: None,
        }
    }

    /// Deny with the exhausted counter surfaced so the UI can render
    /// "0 of N left".
    pub fn deny_exhausted(reason: &str, max: i64) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
            remaining: Some(0),
            max: Some(max),
        }
    }
}

/// Read-only projection of an identity's current quota state, for UI display.
/// Unlike [`AccessDecision`], `remaining` is clamped at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSummary {
    pub is_logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yearly_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}
