use std::sync::Arc;
use std::sync::atomic::Ordering;

use voxpass::access::evaluator::{
    REASON_MONTHLY_LIMIT, REASON_SIGN_UP, REASON_YEARLY_LIMIT,
};
use voxpass::access::types::{AccessDecision, Identity, UNLIMITED};
use voxpass::access::AccessGate;
use voxpass::db::models::PlanTier;
use voxpass::db::store::MemoryStore;

fn gate() -> (Arc<MemoryStore>, AccessGate<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let gate = AccessGate::new(Arc::clone(&store));
    (store, gate)
}

fn user(id: &str) -> Identity {
    Identity::Authenticated {
        user_id: id.to_string(),
    }
}

fn device(fp: &str) -> Identity {
    Identity::Anonymous {
        fingerprint: fp.to_string(),
    }
}

#[tokio::test]
async fn free_plan_remaining_is_min_of_both_windows() {
    let (store, gate) = gate();
    store.seed_profile("u1", PlanTier::Free, 0, 0);

    let decision = gate.evaluate(&user("u1"), "louvre").await;
    assert!(decision.allowed);
    assert_eq!(decision.remaining, Some(3));
    assert_eq!(decision.max, Some(3));

    // Yearly budget is the binding constraint here: min(3-0, 5-4) = 1.
    store.seed_profile("u2", PlanTier::Free, 0, 4);
    let decision = gate.evaluate(&user("u2"), "louvre").await;
    assert!(decision.allowed);
    assert_eq!(decision.remaining, Some(1));
    assert_eq!(decision.max, Some(1));
}

#[tokio::test]
async fn monthly_exhaustion_wins_regardless_of_yearly() {
    let (store, gate) = gate();
    store.seed_profile("u1", PlanTier::Free, 3, 0);

    let decision = gate.evaluate(&user("u1"), "louvre").await;
    assert!(!decision.allowed);
    assert!(decision.reason.as_deref().unwrap().contains("Monthly"));
    assert_eq!(decision.remaining, Some(0));
    assert_eq!(decision.max, Some(3));
    assert_eq!(decision, AccessDecision::deny_exhausted(REASON_MONTHLY_LIMIT, 3));
}

#[tokio::test]
async fn yearly_exhaustion_denies_when_monthly_has_room() {
    let (store, gate) = gate();
    store.seed_profile("u1", PlanTier::Free, 1, 5);

    let decision = gate.evaluate(&user("u1"), "louvre").await;
    assert_eq!(decision, AccessDecision::deny_exhausted(REASON_YEARLY_LIMIT, 5));
    assert!(decision.reason.as_deref().unwrap().contains("Yearly"));
}

#[tokio::test]
async fn paid_plans_are_unlimited_irrespective_of_counters() {
    let (store, gate) = gate();
    store.seed_profile("m", PlanTier::Monthly, 999, 999);
    store.seed_profile("p", PlanTier::PremiumYearly, 999, 999);

    for id in ["m", "p"] {
        let decision = gate.evaluate(&user(id), "louvre").await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, Some(UNLIMITED));
        assert_eq!(decision.max, Some(UNLIMITED));
    }
}

#[tokio::test]
async fn missing_profile_denies_with_explicit_reason() {
    let (_, gate) = gate();

    let decision = gate.evaluate(&user("ghost"), "louvre").await;
    assert!(!decision.allowed);
    assert!(decision.reason.as_deref().unwrap().contains("profile"));
    assert_eq!(decision.remaining, None);
}

#[tokio::test]
async fn anonymous_ladder_walks_down_to_signup_wall() {
    let (_store, gate) = gate();
    let fp = device("fp-eiffel");

    // New visitor, no device_tracking row.
    let decision = gate.evaluate(&fp, "eiffel-tower").await;
    assert_eq!(decision, AccessDecision::allow(2, 2));

    gate.record(&fp, "eiffel-tower").await;
    let decision = gate.evaluate(&fp, "eiffel-tower").await;
    assert_eq!(decision.remaining, Some(1));

    gate.record(&fp, "eiffel-tower").await;
    let decision = gate.evaluate(&fp, "eiffel-tower").await;
    assert_eq!(decision, AccessDecision::deny_exhausted(REASON_SIGN_UP, 2));
}

#[tokio::test]
async fn record_increments_by_exactly_one_each_call() {
    let (store, gate) = gate();
    store.seed_profile("u1", PlanTier::Free, 0, 0);
    let identity = user("u1");

    for _ in 0..3 {
        assert!(gate.evaluate(&identity, "colosseum").await.allowed);
        gate.record(&identity, "colosseum").await;
    }

    // No hidden capping: three records mean monthly_count == 3, so the
    // fourth evaluation now denies.
    let decision = gate.evaluate(&identity, "colosseum").await;
    assert_eq!(decision, AccessDecision::deny_exhausted(REASON_MONTHLY_LIMIT, 3));
    assert_eq!(store.plays().len(), 3);
}

#[tokio::test]
async fn boundary_scenario_monthly_two_yearly_four() {
    let (store, gate) = gate();
    store.seed_profile("u1", PlanTier::Free, 2, 4);
    let identity = user("u1");

    let decision = gate.evaluate(&identity, "acropolis").await;
    assert_eq!(decision, AccessDecision::allow(1, 1));

    gate.record(&identity, "acropolis").await;

    let decision = gate.evaluate(&identity, "acropolis").await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some(REASON_MONTHLY_LIMIT));
}

#[tokio::test]
async fn multibyte_fingerprints_evaluate_without_panicking() {
    // Fingerprints are client-supplied; multi-byte UTF-8 must flow through
    // the allow, deny, and failure log paths like any other id.
    let (store, gate) = gate();
    let fp = device("€€€€€€");

    let decision = gate.evaluate(&fp, "louvre").await;
    assert_eq!(decision, AccessDecision::allow(2, 2));

    gate.record(&fp, "louvre").await;
    gate.record(&fp, "louvre").await;
    assert!(!gate.evaluate(&fp, "louvre").await.allowed);

    store.fail_reads.store(true, Ordering::Relaxed);
    let decision = gate.evaluate(&fp, "louvre").await;
    assert!(!decision.allowed);
}

#[tokio::test]
async fn store_read_failure_resolves_to_conservative_deny() {
    let (store, gate) = gate();
    store.seed_profile("u1", PlanTier::PremiumYearly, 0, 0);
    store.fail_reads.store(true, Ordering::Relaxed);

    let decision = gate.evaluate(&user("u1"), "louvre").await;
    assert!(!decision.allowed);

    let decision = gate.evaluate(&device("fp-1"), "louvre").await;
    assert!(!decision.allowed);
}

#[tokio::test]
async fn record_failures_are_swallowed() {
    let (store, gate) = gate();
    store.seed_profile("u1", PlanTier::Free, 0, 0);
    store.fail_writes.store(true, Ordering::Relaxed);

    // Must not panic or surface anything; counters simply stay put.
    gate.record(&user("u1"), "louvre").await;
    gate.record(&device("fp-1"), "louvre").await;

    store.fail_writes.store(false, Ordering::Relaxed);
    let decision = gate.evaluate(&user("u1"), "louvre").await;
    assert_eq!(decision.remaining, Some(3));
}

#[tokio::test]
async fn summary_clamps_remaining_at_zero() {
    let (store, gate) = gate();
    // Over-consumed profile (e.g. counted before a plan downgrade).
    store.seed_profile("u1", PlanTier::Free, 3, 6);

    let summary = gate.summary(&user("u1")).await;
    assert!(summary.is_logged_in);
    assert_eq!(summary.plan, Some(PlanTier::Free));
    assert_eq!(summary.monthly_count, Some(3));
    assert_eq!(summary.yearly_count, Some(6));
    assert_eq!(summary.remaining, Some(0));
    // min(3, 5 - 6) would be -1, the unlimited sentinel; clamp it too.
    assert_eq!(summary.max, Some(0));
}

#[tokio::test]
async fn summary_for_paid_and_anonymous_identities() {
    let (store, gate) = gate();
    store.seed_profile("p", PlanTier::Monthly, 7, 7);
    store.seed_device("fp-1", 1);

    let summary = gate.summary(&user("p")).await;
    assert_eq!(summary.remaining, Some(UNLIMITED));
    assert_eq!(summary.max, Some(UNLIMITED));
    assert_eq!(summary.monthly_count, None);

    let summary = gate.summary(&device("fp-1")).await;
    assert!(!summary.is_logged_in);
    assert_eq!(summary.remaining, Some(1));
    assert_eq!(summary.max, Some(2));
}
