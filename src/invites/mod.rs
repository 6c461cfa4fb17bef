use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::access::quota::{INVITES_PER_MONTH, QuotaCheck};
use crate::db::store::{CounterStore, StoreError};

pub const REASON_INVALID_INVITE: &str = "Invalid or expired invite link";
pub const REASON_INVITE_LIMIT: &str = "This user has reached their monthly invite limit";
pub const REASON_INVITE_CHECK_FAILED: &str = "Failed to validate invite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteDecision {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl InviteDecision {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: &str) -> Self {
        Self {
            valid: false,
            reason: Some(reason.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralStats {
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
    /// Invites the referrer can still hand out this calendar month.
    pub available_this_month: i64,
}

/// Validates invite codes at account-creation time. An invite code is the
/// referrer's user id; validity depends on the referrer existing and still
/// having invites left in the current calendar month. Same tiered-quota
/// shape as the playback gate, different table.
pub struct InviteGate<S> {
    store: Arc<S>,
}

impl<S> Clone for InviteGate<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CounterStore> InviteGate<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn validate(&self, code: &str) -> InviteDecision {
        let referrer = match self.store.profile(code).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return InviteDecision::invalid(REASON_INVALID_INVITE),
            Err(e) => {
                warn!(code = %code, error = %e, "referrer lookup failed");
                return InviteDecision::invalid(REASON_INVITE_CHECK_FAILED);
            }
        };

        let used = match self
            .store
            .referrals_since(code, month_start(Utc::now()))
            .await
        {
            Ok(used) => used,
            Err(e) => {
                warn!(code = %code, error = %e, "referral count failed");
                return InviteDecision::invalid(REASON_INVITE_CHECK_FAILED);
            }
        };

        match INVITES_PER_MONTH.check(referrer.subscription_plan, used) {
            QuotaCheck::Exhausted => InviteDecision::invalid(REASON_INVITE_LIMIT),
            QuotaCheck::Unlimited | QuotaCheck::Within { .. } => InviteDecision::valid(),
        }
    }

    /// Referral dashboard numbers. `None` when the referrer has no profile.
    pub async fn stats(&self, user_id: &str) -> Result<Option<ReferralStats>, StoreError> {
        let Some(profile) = self.store.profile(user_id).await? else {
            return Ok(None);
        };

        let (pending, completed) = self.store.referral_status_counts(user_id).await?;
        let used = self
            .store
            .referrals_since(user_id, month_start(Utc::now()))
            .await?;
        let limit = INVITES_PER_MONTH.limit(profile.subscription_plan);

        Ok(Some(ReferralStats {
            total: pending + completed,
            pending,
            completed,
            available_this_month: (limit - used).max(0),
        }))
    }
}

/// Midnight UTC on the first day of `now`'s calendar month.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

/// Shareable invite link: `{base_url}/signup?ref={referrer_user_id}`.
pub fn invite_link(base_url: &str, user_id: &str) -> String {
    format!("{}/signup?ref={}", base_url.trim_end_matches('/'), user_id)
}
