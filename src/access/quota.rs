use crate::db::models::PlanTier;

use super::types::UNLIMITED;

/// A per-plan quota table. Both the playback allowances and the invite
/// allowances are instances of this one rule shape; a limit of
/// [`UNLIMITED`] disables the check for that tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TieredQuota {
    free: i64,
    monthly: i64,
    premium: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaCheck {
    Unlimited,
    Within { remaining: i64 },
    Exhausted,
}

impl TieredQuota {
    pub const fn new(free: i64, monthly: i64, premium: i64) -> Self {
        Self {
            free,
            monthly,
            premium,
        }
    }

    pub fn limit(&self, plan: PlanTier) -> i64 {
        match plan {
            PlanTier::Free => self.free,
            PlanTier::Monthly => self.monthly,
            PlanTier::PremiumYearly => self.premium,
        }
    }

    /// Evaluate `used` against the plan's limit. Evaluation happens strictly
    /// before any increment, so `used == limit` is already exhausted.
    pub fn check(&self, plan: PlanTier, used: i64) -> QuotaCheck {
        let limit = self.limit(plan);
        if limit == UNLIMITED {
            QuotaCheck::Unlimited
        } else if used >= limit {
            QuotaCheck::Exhausted
        } else {
            QuotaCheck::Within {
                remaining: limit - used,
            }
        }
    }
}

/// Free-plan playback allowances; paid plans are never counter-checked.
pub const MONTHLY_PLAYS: TieredQuota = TieredQuota::new(3, UNLIMITED, UNLIMITED);
pub const YEARLY_PLAYS: TieredQuota = TieredQuota::new(5, UNLIMITED, UNLIMITED);

/// Flat allowance for anonymous visitors, keyed by device fingerprint.
pub const DEVICE_PLAYS: i64 = 2;

/// Invites per calendar month, by the referrer's plan.
pub const INVITES_PER_MONTH: TieredQuota = TieredQuota::new(2, 5, 10);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_plan_monthly_plays_exhaust_at_three() {
        assert_eq!(
            MONTHLY_PLAYS.check(PlanTier::Free, 0),
            QuotaCheck::Within { remaining: 3 }
        );
        assert_eq!(
            MONTHLY_PLAYS.check(PlanTier::Free, 2),
            QuotaCheck::Within { remaining: 1 }
        );
        assert_eq!(MONTHLY_PLAYS.check(PlanTier::Free, 3), QuotaCheck::Exhausted);
        assert_eq!(MONTHLY_PLAYS.check(PlanTier::Free, 7), QuotaCheck::Exhausted);
    }

    #[test]
    fn paid_plans_are_never_counter_checked() {
        assert_eq!(
            MONTHLY_PLAYS.check(PlanTier::Monthly, 1_000),
            QuotaCheck::Unlimited
        );
        assert_eq!(
            YEARLY_PLAYS.check(PlanTier::PremiumYearly, 1_000),
            QuotaCheck::Unlimited
        );
    }

    #[test]
    fn invite_limits_follow_the_plan_ladder() {
        assert_eq!(INVITES_PER_MONTH.limit(PlanTier::Free), 2);
        assert_eq!(INVITES_PER_MONTH.limit(PlanTier::Monthly), 5);
        assert_eq!(INVITES_PER_MONTH.limit(PlanTier::PremiumYearly), 10);
        assert_eq!(
            INVITES_PER_MONTH.check(PlanTier::Monthly, 4),
            QuotaCheck::Within { remaining: 1 }
        );
        assert_eq!(
            INVITES_PER_MONTH.check(PlanTier::Monthly, 5),
            QuotaCheck::Exhausted
        );
    }
}
