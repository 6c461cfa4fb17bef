use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::models::{Profile, ReferralStatus};

/// Read or write against the counter store failed. Reads during evaluation
/// resolve to a conservative deny; writes during recording are logged and
/// swallowed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store read failed: {0}")]
    Read(String),
    #[error("store write failed: {0}")]
    Write(String),
}

/// The persistent counter store as seen by the entitlement and invite gates.
/// Implemented by the Postgres [`Repository`](crate::db::repository::Repository)
/// in production and by [`MemoryStore`] in tests.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;

    /// Missing rows count as zero plays.
    async fn device_play_count(&self, fingerprint: &str) -> Result<i64, StoreError>;

    /// Atomic `+1` on both audio counters. Never read-modify-write: plays can
    /// race across tabs and lost updates would under-count.
    async fn increment_audio_counts(&self, user_id: &str) -> Result<(), StoreError>;

    /// Upsert `+1` for the fingerprint, creating the row at count 1.
    async fn bump_device_play(&self, fingerprint: &str) -> Result<(), StoreError>;

    /// Append one playback grant to the history log.
    async fn append_play(&self, user_id: &str, tour_id: &str) -> Result<(), StoreError>;

    async fn referrals_since(
        &self,
        referrer_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// `(pending, completed)` row counts for a referrer, all time.
    async fn referral_status_counts(&self, referrer_id: &str) -> Result<(i64, i64), StoreError>;
}

pub use memory::MemoryStore;

mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::db::models::PlanTier;

    #[derive(Default)]
    struct Inner {
        profiles: HashMap<String, Profile>,
        devices: HashMap<String, i64>,
        plays: Vec<(String, String)>,
        referrals: Vec<(String, ReferralStatus, DateTime<Utc>)>,
    }

    /// In-memory counter store. Drives the evaluator test suite and doubles
    /// as a scratch backend for local experiments; the failure toggles
    /// simulate an unreachable database.
    #[derive(Default)]
    pub struct MemoryStore {
        inner: Mutex<Inner>,
        pub fail_reads: AtomicBool,
        pub fail_writes: AtomicBool,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed_profile(&self, user_id: &str, plan: PlanTier, monthly: i32, yearly: i32) {
            let now = Utc::now();
            self.lock().profiles.insert(
                user_id.to_string(),
                Profile {
                    id: user_id.to_string(),
                    subscription_plan: plan,
                    monthly_audio_count: monthly,
                    yearly_audio_count: yearly,
                    name: None,
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        pub fn seed_device(&self, fingerprint: &str, count: i64) {
            self.lock().devices.insert(fingerprint.to_string(), count);
        }

        pub fn add_referral(&self, referrer_id: &str, status: ReferralStatus, at: DateTime<Utc>) {
            self.lock()
                .referrals
                .push((referrer_id.to_string(), status, at));
        }

        pub fn plays(&self) -> Vec<(String, String)> {
            self.lock().plays.clone()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
            self.inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }

        fn read_guard(&self) -> Result<(), StoreError> {
            if self.fail_reads.load(Ordering::Relaxed) {
                Err(StoreError::Read("memory store offline".into()))
            } else {
                Ok(())
            }
        }

        fn write_guard(&self) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::Relaxed) {
                Err(StoreError::Write("memory store offline".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CounterStore for MemoryStore {
        async fn profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
            self.read_guard()?;
            Ok(self.lock().profiles.get(user_id).cloned())
        }

        async fn device_play_count(&self, fingerprint: &str) -> Result<i64, StoreError> {
            self.read_guard()?;
            Ok(self.lock().devices.get(fingerprint).copied().unwrap_or(0))
        }

        async fn increment_audio_counts(&self, user_id: &str) -> Result<(), StoreError> {
            self.write_guard()?;
            let mut inner = self.lock();
            let profile = inner
                .profiles
                .get_mut(user_id)
                .ok_or_else(|| StoreError::Write(format!("no profile {user_id}")))?;
            profile.monthly_audio_count += 1;
            profile.yearly_audio_count += 1;
            profile.updated_at = Utc::now();
            Ok(())
        }

        async fn bump_device_play(&self, fingerprint: &str) -> Result<(), StoreError> {
            self.write_guard()?;
            *self.lock().devices.entry(fingerprint.to_string()).or_insert(0) += 1;
            Ok(())
        }

        async fn append_play(&self, user_id: &str, tour_id: &str) -> Result<(), StoreError> {
            self.write_guard()?;
            self.lock()
                .plays
                .push((user_id.to_string(), tour_id.to_string()));
            Ok(())
        }

        async fn referrals_since(
            &self,
            referrer_id: &str,
            since: DateTime<Utc>,
        ) -> Result<i64, StoreError> {
            self.read_guard()?;
            Ok(self
                .lock()
                .referrals
                .iter()
                .filter(|(id, _, at)| id == referrer_id && *at >= since)
                .count() as i64)
        }

        async fn referral_status_counts(
            &self,
            referrer_id: &str,
        ) -> Result<(i64, i64), StoreError> {
            self.read_guard()?;
            let inner = self.lock();
            let mut pending = 0;
            let mut completed = 0;
            for (_, status, _) in inner.referrals.iter().filter(|(id, _, _)| id == referrer_id) {
                match status {
                    ReferralStatus::Pending => pending += 1,
                    ReferralStatus::Completed => completed += 1,
                }
            }
            Ok((pending, completed))
        }
    }
}
