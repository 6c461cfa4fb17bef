use std::sync::Arc;

use chrono::{Duration, Utc};
use voxpass::db::models::{PlanTier, ReferralStatus};
use voxpass::db::store::MemoryStore;
use voxpass::invites::{
    InviteGate, REASON_INVALID_INVITE, REASON_INVITE_LIMIT, month_start,
};

fn gate() -> (Arc<MemoryStore>, InviteGate<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let gate = InviteGate::new(Arc::clone(&store));
    (store, gate)
}

fn seed_referrals(store: &MemoryStore, referrer: &str, this_month: usize) {
    // month_start(now) <= now, so "now" always lands inside the window.
    for _ in 0..this_month {
        store.add_referral(referrer, ReferralStatus::Pending, Utc::now());
    }
}

#[tokio::test]
async fn unknown_referrer_is_invalid() {
    let (_, gate) = gate();

    let decision = gate.validate("nobody").await;
    assert!(!decision.valid);
    assert_eq!(decision.reason.as_deref(), Some(REASON_INVALID_INVITE));
}

#[tokio::test]
async fn free_referrer_caps_at_two_per_month() {
    let (store, gate) = gate();
    store.seed_profile("ref", PlanTier::Free, 0, 0);

    seed_referrals(&store, "ref", 1);
    assert!(gate.validate("ref").await.valid);

    seed_referrals(&store, "ref", 1);
    let decision = gate.validate("ref").await;
    assert!(!decision.valid);
    assert_eq!(decision.reason.as_deref(), Some(REASON_INVITE_LIMIT));
}

#[tokio::test]
async fn monthly_referrer_caps_at_five() {
    let (store, gate) = gate();
    store.seed_profile("ref", PlanTier::Monthly, 0, 0);

    seed_referrals(&store, "ref", 4);
    assert!(gate.validate("ref").await.valid);

    seed_referrals(&store, "ref", 1);
    assert!(!gate.validate("ref").await.valid);
}

#[tokio::test]
async fn premium_referrer_caps_at_ten() {
    let (store, gate) = gate();
    store.seed_profile("ref", PlanTier::PremiumYearly, 0, 0);

    seed_referrals(&store, "ref", 9);
    assert!(gate.validate("ref").await.valid);

    seed_referrals(&store, "ref", 1);
    assert!(!gate.validate("ref").await.valid);
}

#[tokio::test]
async fn referrals_from_previous_months_do_not_count() {
    let (store, gate) = gate();
    store.seed_profile("ref", PlanTier::Free, 0, 0);

    let last_month = month_start(Utc::now()) - Duration::days(3);
    store.add_referral("ref", ReferralStatus::Completed, last_month);
    store.add_referral("ref", ReferralStatus::Completed, last_month);

    // Both rows predate the window; the free cap of 2 is untouched.
    assert!(gate.validate("ref").await.valid);
}

#[tokio::test]
async fn stats_report_counts_and_monthly_headroom() {
    let (store, gate) = gate();
    store.seed_profile("ref", PlanTier::Monthly, 0, 0);

    let last_month = month_start(Utc::now()) - Duration::days(3);
    store.add_referral("ref", ReferralStatus::Completed, last_month);
    store.add_referral("ref", ReferralStatus::Pending, Utc::now());
    store.add_referral("ref", ReferralStatus::Completed, Utc::now());

    let stats = gate.stats("ref").await.unwrap().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.completed, 2);
    // Two of the five monthly invites are used this month.
    assert_eq!(stats.available_this_month, 3);

    assert!(gate.stats("nobody").await.unwrap().is_none());
}
