use std::cmp::min;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::db::models::PlanTier;
use crate::db::store::CounterStore;
use crate::utils::logs_fmt::abbrev;

use super::quota::{DEVICE_PLAYS, MONTHLY_PLAYS, QuotaCheck, YEARLY_PLAYS};
use super::types::{AccessDecision, AccessSummary, Identity, UNLIMITED};

pub const REASON_MONTHLY_LIMIT: &str =
    "Monthly limit reached. Upgrade to access more audio tours.";
pub const REASON_YEARLY_LIMIT: &str =
    "Yearly limit reached. Upgrade to access unlimited audio tours.";
pub const REASON_SIGN_UP: &str = "Sign up to access more audio tours";
pub const REASON_NO_PROFILE: &str = "User profile not found";
pub const REASON_CHECK_FAILED: &str = "Error checking access permissions";

/// The entitlement evaluator. Decides whether an identity may start playback
/// of a tour and records consumption after a grant. One instance per process,
/// passed explicitly to callers; holds no mutable state of its own.
pub struct AccessGate<S> {
    store: Arc<S>,
}

impl<S> Clone for AccessGate<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CounterStore> AccessGate<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Evaluate whether `identity` may begin playback of `tour_id`. Store
    /// failures resolve to a conservative deny, never an error; the UI
    /// renders every deny the same way.
    pub async fn evaluate(&self, identity: &Identity, tour_id: &str) -> AccessDecision {
        match identity {
            Identity::Authenticated { user_id } => self.evaluate_user(user_id, tour_id).await,
            Identity::Anonymous { fingerprint } => self.evaluate_device(fingerprint, tour_id).await,
        }
    }

    async fn evaluate_user(&self, user_id: &str, tour_id: &str) -> AccessDecision {
        let profile = match self.store.profile(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return AccessDecision::deny(REASON_NO_PROFILE),
            Err(e) => {
                warn!(user = %user_id, error = %e, "profile read failed during evaluation");
                return AccessDecision::deny(REASON_CHECK_FAILED);
            }
        };

        let plan = profile.subscription_plan;
        if plan != PlanTier::Free {
            return AccessDecision::allow_unlimited();
        }

        let monthly = i64::from(profile.monthly_audio_count);
        let yearly = i64::from(profile.yearly_audio_count);

        // Monthly exhaustion wins over yearly when both apply.
        if let QuotaCheck::Exhausted = MONTHLY_PLAYS.check(plan, monthly) {
            return AccessDecision::deny_exhausted(REASON_MONTHLY_LIMIT, MONTHLY_PLAYS.limit(plan));
        }
        if let QuotaCheck::Exhausted = YEARLY_PLAYS.check(plan, yearly) {
            return AccessDecision::deny_exhausted(REASON_YEARLY_LIMIT, YEARLY_PLAYS.limit(plan));
        }

        let monthly_limit = MONTHLY_PLAYS.limit(plan);
        let yearly_limit = YEARLY_PLAYS.limit(plan);
        debug!(user = %user_id, tour = %tour_id, monthly, yearly, "free-plan playback allowed");
        AccessDecision::allow(
            min(monthly_limit - monthly, yearly_limit - yearly),
            min(monthly_limit, yearly_limit - yearly),
        )
    }

    async fn evaluate_device(&self, fingerprint: &str, tour_id: &str) -> AccessDecision {
        let count = match self.store.device_play_count(fingerprint).await {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    device = %abbrev(fingerprint),
                    error = %e,
                    "device read failed during evaluation"
                );
                return AccessDecision::deny(REASON_CHECK_FAILED);
            }
        };

        if count >= DEVICE_PLAYS {
            return AccessDecision::deny_exhausted(REASON_SIGN_UP, DEVICE_PLAYS);
        }

        debug!(device = %abbrev(fingerprint), tour = %tour_id, count, "anonymous playback allowed");
        AccessDecision::allow(DEVICE_PLAYS - count, DEVICE_PLAYS)
    }

    /// Record one granted playback. Caller contract: only call after
    /// [`evaluate`](Self::evaluate) allowed this identity+tour; nothing is
    /// re-validated here and every call increments by exactly one. Failures
    /// are logged and swallowed so accounting never blocks playback already
    /// under way.
    pub async fn record(&self, identity: &Identity, tour_id: &str) {
        match identity {
            Identity::Authenticated { user_id } => {
                if let Err(e) = self.store.increment_audio_counts(user_id).await {
                    warn!(user = %user_id, error = %e, "failed to increment audio counts");
                }
                if let Err(e) = self.store.append_play(user_id, tour_id).await {
                    warn!(user = %user_id, tour = %tour_id, error = %e, "failed to append tour history");
                }
            }
            Identity::Anonymous { fingerprint } => {
                if let Err(e) = self.store.bump_device_play(fingerprint).await {
                    warn!(
                        device = %abbrev(fingerprint),
                        tour = %tour_id,
                        error = %e,
                        "failed to bump device play count"
                    );
                }
            }
        }
    }

    /// Read-only projection of the identity's quota state for display. Same
    /// branching as evaluation, but without a tour and without a deny reason;
    /// `remaining` is clamped at zero.
    pub async fn summary(&self, identity: &Identity) -> AccessSummary {
        match identity {
            Identity::Authenticated { user_id } => {
                let profile = match self.store.profile(user_id).await {
                    Ok(Some(profile)) => profile,
                    Ok(None) => {
                        return AccessSummary {
                            is_logged_in: true,
                            ..AccessSummary::default()
                        };
                    }
                    Err(e) => {
                        warn!(user = %user_id, error = %e, "profile read failed for summary");
                        return AccessSummary {
                            is_logged_in: true,
                            ..AccessSummary::default()
                        };
                    }
                };

                let plan = profile.subscription_plan;
                if plan != PlanTier::Free {
                    return AccessSummary {
                        is_logged_in: true,
                        plan: Some(plan),
                        remaining: Some(UNLIMITED),
                        max: Some(UNLIMITED),
                        ..AccessSummary::default()
                    };
                }

                let monthly = i64::from(profile.monthly_audio_count);
                let yearly = i64::from(profile.yearly_audio_count);
                let monthly_limit = MONTHLY_PLAYS.limit(plan);
                let yearly_limit = YEARLY_PLAYS.limit(plan);
                let remaining = min(monthly_limit - monthly, yearly_limit - yearly);

                AccessSummary {
                    is_logged_in: true,
                    plan: Some(plan),
                    monthly_count: Some(monthly),
                    yearly_count: Some(yearly),
                    remaining: Some(remaining.max(0)),
                    max: Some(min(monthly_limit, yearly_limit - yearly).max(0)),
                }
            }
            Identity::Anonymous { fingerprint } => {
                let count = self
                    .store
                    .device_play_count(fingerprint)
                    .await
                    .unwrap_or(DEVICE_PLAYS);

                AccessSummary {
                    is_logged_in: false,
                    remaining: Some((DEVICE_PLAYS - count).max(0)),
                    max: Some(DEVICE_PLAYS),
                    ..AccessSummary::default()
                }
            }
        }
    }
}
