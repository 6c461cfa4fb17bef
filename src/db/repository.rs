use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::models::{
    Bookmark, DeviceTracking, PlanTier, Profile, Referral, TourHistory, UserPreferences,
};
use crate::db::store::{CounterStore, StoreError};
use crate::utils::error::VoxpassError;

/// Postgres-backed persistent counter store. All counter mutations are
/// single-statement atomic increments or upserts; none read the old value
/// first.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, VoxpassError> {
        let profile = sqlx::query_as("SELECT * FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(profile)
    }

    pub async fn upsert_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        plan: PlanTier,
    ) -> Result<Profile, VoxpassError> {
        let profile = sqlx::query_as(
            r#"
            INSERT INTO profiles (id, name, subscription_plan)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET name = COALESCE(EXCLUDED.name, profiles.name),
                subscription_plan = EXCLUDED.subscription_plan,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(plan)
        .fetch_one(self.pool())
        .await?;

        Ok(profile)
    }

    pub async fn set_plan(&self, user_id: &str, plan: PlanTier) -> Result<Profile, VoxpassError> {
        let profile = sqlx::query_as(
            r#"
            UPDATE profiles
            SET subscription_plan = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(plan)
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;

        Ok(profile)
    }

    pub async fn bump_audio_counts(&self, user_id: &str) -> Result<(), VoxpassError> {
        sqlx::query(
            r#"
            UPDATE profiles
            SET monthly_audio_count = monthly_audio_count + 1,
                yearly_audio_count = yearly_audio_count + 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Zero the monthly counters for every profile. Run from cron at the
    /// start of each calendar month.
    pub async fn reset_monthly_counts(&self) -> Result<u64, VoxpassError> {
        let result = sqlx::query(
            "UPDATE profiles SET monthly_audio_count = 0, updated_at = NOW() \
             WHERE monthly_audio_count > 0",
        )
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }

    /// Zero both counters; the yearly window subsumes the monthly one.
    pub async fn reset_yearly_counts(&self) -> Result<u64, VoxpassError> {
        let result = sqlx::query(
            "UPDATE profiles SET monthly_audio_count = 0, yearly_audio_count = 0, \
             updated_at = NOW() WHERE monthly_audio_count > 0 OR yearly_audio_count > 0",
        )
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn get_device(
        &self,
        fingerprint: &str,
    ) -> Result<Option<DeviceTracking>, VoxpassError> {
        let device = sqlx::query_as("SELECT * FROM device_tracking WHERE device_fingerprint = $1")
            .bind(fingerprint)
            .fetch_optional(self.pool())
            .await?;

        Ok(device)
    }

    pub async fn list_devices(&self, limit: i64) -> Result<Vec<DeviceTracking>, VoxpassError> {
        let devices =
            sqlx::query_as("SELECT * FROM device_tracking ORDER BY last_accessed DESC LIMIT $1")
                .bind(limit)
                .fetch_all(self.pool())
                .await?;

        Ok(devices)
    }

    pub async fn bump_device(&self, fingerprint: &str) -> Result<(), VoxpassError> {
        sqlx::query(
            r#"
            INSERT INTO device_tracking (device_fingerprint, audio_tours_accessed, last_accessed)
            VALUES ($1, 1, NOW())
            ON CONFLICT (device_fingerprint) DO UPDATE
            SET audio_tours_accessed = device_tracking.audio_tours_accessed + 1,
                last_accessed = NOW()
            "#,
        )
        .bind(fingerprint)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn append_tour_history(
        &self,
        user_id: &str,
        tour_id: &str,
    ) -> Result<(), VoxpassError> {
        sqlx::query("INSERT INTO tour_history (user_id, tour_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(tour_id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Mark the most recent open history row for this user+tour as finished.
    pub async fn finish_tour_history(
        &self,
        user_id: &str,
        tour_id: &str,
        duration_listened: i32,
    ) -> Result<(), VoxpassError> {
        sqlx::query(
            r#"
            UPDATE tour_history
            SET duration_listened = $3, completed = TRUE, completed_at = NOW()
            WHERE id = (
                SELECT id FROM tour_history
                WHERE user_id = $1 AND tour_id = $2 AND completed = FALSE
                ORDER BY started_at DESC
                LIMIT 1
            )
            "#,
        )
        .bind(user_id)
        .bind(tour_id)
        .bind(duration_listened)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn tour_history(&self, user_id: &str) -> Result<Vec<TourHistory>, VoxpassError> {
        let rows =
            sqlx::query_as("SELECT * FROM tour_history WHERE user_id = $1 ORDER BY started_at DESC")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;

        Ok(rows)
    }

    pub async fn create_referral(
        &self,
        referrer_id: &str,
        referred_id: &str,
    ) -> Result<Referral, VoxpassError> {
        let referral = sqlx::query_as(
            r#"
            INSERT INTO referrals (referrer_id, referred_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(referrer_id)
        .bind(referred_id)
        .fetch_one(self.pool())
        .await?;

        Ok(referral)
    }

    pub async fn complete_referral(&self, referred_id: &str) -> Result<u64, VoxpassError> {
        let result = sqlx::query(
            "UPDATE referrals SET status = 'completed' WHERE referred_id = $1 AND status = 'pending'",
        )
        .bind(referred_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_referrals_since(
        &self,
        referrer_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, VoxpassError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM referrals WHERE referrer_id = $1 AND created_at >= $2",
        )
        .bind(referrer_id)
        .bind(since)
        .fetch_one(self.pool())
        .await?;

        Ok(count)
    }

    pub async fn count_referrals_by_status(
        &self,
        referrer_id: &str,
    ) -> Result<(i64, i64), VoxpassError> {
        let (pending, completed): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'pending'),
                COUNT(*) FILTER (WHERE status = 'completed')
            FROM referrals
            WHERE referrer_id = $1
            "#,
        )
        .bind(referrer_id)
        .fetch_one(self.pool())
        .await?;

        Ok((pending, completed))
    }

    pub async fn bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>, VoxpassError> {
        let rows =
            sqlx::query_as("SELECT * FROM bookmarks WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;

        Ok(rows)
    }

    pub async fn add_bookmark(
        &self,
        user_id: &str,
        tour_id: &str,
    ) -> Result<Bookmark, VoxpassError> {
        let bookmark = sqlx::query_as(
            r#"
            INSERT INTO bookmarks (user_id, tour_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, tour_id) DO UPDATE SET tour_id = EXCLUDED.tour_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(tour_id)
        .fetch_one(self.pool())
        .await?;

        Ok(bookmark)
    }

    pub async fn remove_bookmark(&self, user_id: &str, tour_id: &str) -> Result<u64, VoxpassError> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND tour_id = $2")
            .bind(user_id)
            .bind(tour_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn get_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<UserPreferences>, VoxpassError> {
        let prefs = sqlx::query_as("SELECT * FROM user_preferences WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(prefs)
    }

    pub async fn upsert_preferences(
        &self,
        user_id: &str,
        audio_speed: f64,
        volume: f64,
    ) -> Result<UserPreferences, VoxpassError> {
        let prefs = sqlx::query_as(
            r#"
            INSERT INTO user_preferences (user_id, audio_speed, volume)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET audio_speed = EXCLUDED.audio_speed,
                volume = EXCLUDED.volume,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(audio_speed)
        .bind(volume)
        .fetch_one(self.pool())
        .await?;

        Ok(prefs)
    }
}

fn read_err(e: VoxpassError) -> StoreError {
    StoreError::Read(e.to_string())
}

fn write_err(e: VoxpassError) -> StoreError {
    StoreError::Write(e.to_string())
}

#[async_trait]
impl CounterStore for Repository {
    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.get_profile(user_id).await.map_err(read_err)
    }

    async fn device_play_count(&self, fingerprint: &str) -> Result<i64, StoreError> {
        let device = self.get_device(fingerprint).await.map_err(read_err)?;
        Ok(device.map(|d| d.audio_tours_accessed as i64).unwrap_or(0))
    }

    async fn increment_audio_counts(&self, user_id: &str) -> Result<(), StoreError> {
        self.bump_audio_counts(user_id).await.map_err(write_err)
    }

    async fn bump_device_play(&self, fingerprint: &str) -> Result<(), StoreError> {
        self.bump_device(fingerprint).await.map_err(write_err)
    }

    async fn append_play(&self, user_id: &str, tour_id: &str) -> Result<(), StoreError> {
        self.append_tour_history(user_id, tour_id)
            .await
            .map_err(write_err)
    }

    async fn referrals_since(
        &self,
        referrer_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.count_referrals_since(referrer_id, since)
            .await
            .map_err(read_err)
    }

    async fn referral_status_counts(&self, referrer_id: &str) -> Result<(i64, i64), StoreError> {
        self.count_referrals_by_status(referrer_id)
            .await
            .map_err(read_err)
    }
}
