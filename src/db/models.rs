use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Subscription tier. Stored in Postgres as the `subscription_plan` enum;
/// the yearly tier is persisted and serialized as plain `premium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, clap::ValueEnum)]
#[sqlx(type_name = "subscription_plan", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Monthly,
    #[sqlx(rename = "premium")]
    #[serde(rename = "premium")]
    #[value(name = "premium")]
    PremiumYearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "referral_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    Pending,
    Completed,
}

/// One row per authenticated user. The audio counters accumulate over their
/// quota windows and are zeroed only by the explicit reset operations.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub subscription_plan: PlanTier,
    pub monthly_audio_count: i32,
    pub yearly_audio_count: i32,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Anonymous consumption counter, keyed by device fingerprint. Rows are only
/// ever created and incremented.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeviceTracking {
    pub device_fingerprint: String,
    pub audio_tours_accessed: i32,
    pub last_accessed: DateTime<Utc>,
}

/// Playback history for authenticated users. A row is appended when access
/// is granted and finished (duration, completed flag) when the player
/// reports completion.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TourHistory {
    pub id: i64,
    pub user_id: String,
    pub tour_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_listened: i32,
    pub completed: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Referral {
    pub id: i64,
    pub referrer_id: String,
    pub referred_id: String,
    pub status: ReferralStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub user_id: String,
    pub tour_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    pub audio_speed: f64,
    pub volume: f64,
    pub updated_at: DateTime<Utc>,
}
