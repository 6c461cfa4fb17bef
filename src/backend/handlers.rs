use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::access::evaluator::REASON_CHECK_FAILED;
use crate::access::fingerprint::{self, DeviceProfile};
use crate::access::types::AccessDecision;
use crate::identity;
use crate::invites::invite_link;
use crate::utils::error::VoxpassError;

use super::AppState;

/// Session fields shared by the access endpoints: an optional user session
/// token plus the device fingerprint computed at page load.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub token: Option<String>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccessRequest {
    #[serde(flatten)]
    pub session: SessionRequest,
    pub tour_id: String,
}

pub async fn check_access_handler(
    State(state): State<AppState>,
    Json(payload): Json<AccessRequest>,
) -> Result<impl IntoResponse, VoxpassError> {
    let identity = identity::resolve(
        state.identity.as_ref(),
        payload.session.token.as_deref(),
        payload.session.fingerprint.as_deref(),
    )
    .await;

    let decision = match identity {
        Some(identity) => {
            let decision = state.gate.evaluate(&identity, &payload.tour_id).await;
            info!(
                tour = %payload.tour_id,
                logged_in = identity.is_authenticated(),
                allowed = decision.allowed,
                "Access check"
            );
            decision
        }
        None => {
            warn!(tour = %payload.tour_id, "Access check with unresolvable session");
            AccessDecision::deny(REASON_CHECK_FAILED)
        }
    };

    Ok((StatusCode::OK, Json(decision)))
}

pub async fn record_access_handler(
    State(state): State<AppState>,
    Json(payload): Json<AccessRequest>,
) -> Result<impl IntoResponse, VoxpassError> {
    let identity = identity::resolve(
        state.identity.as_ref(),
        payload.session.token.as_deref(),
        payload.session.fingerprint.as_deref(),
    )
    .await;

    match identity {
        Some(identity) => {
            state.gate.record(&identity, &payload.tour_id).await;
            Ok((
                StatusCode::OK,
                Json(serde_json::json!({"status": "recorded"})),
            ))
        }
        None => {
            // Nothing to account against; playback itself is not blocked.
            warn!(tour = %payload.tour_id, "Record request with unresolvable session");
            Ok((
                StatusCode::OK,
                Json(serde_json::json!({"status": "ignored"})),
            ))
        }
    }
}

pub async fn access_summary_handler(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> Result<impl IntoResponse, VoxpassError> {
    let identity = identity::resolve(
        state.identity.as_ref(),
        payload.token.as_deref(),
        payload.fingerprint.as_deref(),
    )
    .await;

    let summary = match identity {
        Some(identity) => state.gate.summary(&identity).await,
        None => Default::default(),
    };

    Ok((StatusCode::OK, Json(summary)))
}

#[derive(Debug, Deserialize)]
pub struct FingerprintRequest {
    pub user_agent: String,
    pub language: String,
    pub platform: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub timezone: String,
    pub canvas: String,
}

pub async fn derive_fingerprint_handler(
    Json(payload): Json<FingerprintRequest>,
) -> Result<impl IntoResponse, VoxpassError> {
    let profile = DeviceProfile::new(
        payload.user_agent,
        payload.language,
        payload.platform,
        payload.screen_width,
        payload.screen_height,
        payload.timezone,
        payload.canvas,
    );
    let fingerprint = fingerprint::derive(&profile)?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "fingerprint": fingerprint })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub code: String,
}

pub async fn validate_invite_handler(
    State(state): State<AppState>,
    Json(payload): Json<InviteRequest>,
) -> Result<impl IntoResponse, VoxpassError> {
    let decision = state.invites.validate(&payload.code).await;

    info!(code = %payload.code, valid = decision.valid, "Invite validation");

    Ok((StatusCode::OK, Json(decision)))
}

#[derive(Debug, Deserialize)]
pub struct ReferralRequest {
    pub referrer_id: String,
    pub referred_id: String,
}

pub async fn create_referral_handler(
    State(state): State<AppState>,
    Json(payload): Json<ReferralRequest>,
) -> Result<impl IntoResponse, VoxpassError> {
    let decision = state.invites.validate(&payload.referrer_id).await;
    if !decision.valid {
        return Err(VoxpassError::ValidationError(
            decision
                .reason
                .unwrap_or_else(|| "invite is not valid".to_string()),
        ));
    }

    let referral = state
        .repo
        .create_referral(&payload.referrer_id, &payload.referred_id)
        .await?;

    info!(
        referrer = %payload.referrer_id,
        referred = %payload.referred_id,
        "Referral created"
    );

    Ok((StatusCode::CREATED, Json(referral)))
}

#[derive(Debug, Deserialize)]
pub struct CompleteReferralRequest {
    pub referred_id: String,
}

pub async fn complete_referral_handler(
    State(state): State<AppState>,
    Json(payload): Json<CompleteReferralRequest>,
) -> Result<impl IntoResponse, VoxpassError> {
    let updated = state.repo.complete_referral(&payload.referred_id).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "completed": updated })),
    ))
}

pub async fn referral_stats_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, VoxpassError> {
    let stats = state
        .invites
        .stats(&user_id)
        .await?
        .ok_or_else(|| VoxpassError::NotFound(format!("no profile for {user_id}")))?;

    let link = invite_link(&state.site_url, &user_id);

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "stats": stats,
            "invite_link": link,
        })),
    ))
}

pub async fn tour_history_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, VoxpassError> {
    let rows = state.repo.tour_history(&user_id).await?;
    Ok((StatusCode::OK, Json(rows)))
}

#[derive(Debug, Deserialize)]
pub struct HistoryUpdateRequest {
    pub user_id: String,
    pub tour_id: String,
    pub duration_listened: i32,
}

pub async fn finish_history_handler(
    State(state): State<AppState>,
    Json(payload): Json<HistoryUpdateRequest>,
) -> Result<impl IntoResponse, VoxpassError> {
    if payload.duration_listened < 0 {
        return Err(VoxpassError::ValidationError(
            "duration_listened must be >= 0".to_string(),
        ));
    }

    state
        .repo
        .finish_tour_history(&payload.user_id, &payload.tour_id, payload.duration_listened)
        .await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"status": "updated"})),
    ))
}

pub async fn list_bookmarks_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, VoxpassError> {
    let rows = state.repo.bookmarks(&user_id).await?;
    Ok((StatusCode::OK, Json(rows)))
}

#[derive(Debug, Deserialize)]
pub struct BookmarkRequest {
    pub user_id: String,
    pub tour_id: String,
}

pub async fn add_bookmark_handler(
    State(state): State<AppState>,
    Json(payload): Json<BookmarkRequest>,
) -> Result<impl IntoResponse, VoxpassError> {
    let bookmark = state
        .repo
        .add_bookmark(&payload.user_id, &payload.tour_id)
        .await?;

    Ok((StatusCode::CREATED, Json(bookmark)))
}

pub async fn remove_bookmark_handler(
    State(state): State<AppState>,
    Path((user_id, tour_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, VoxpassError> {
    let removed = state.repo.remove_bookmark(&user_id, &tour_id).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "removed": removed })),
    ))
}

pub async fn get_preferences_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, VoxpassError> {
    let prefs = state.repo.get_preferences(&user_id).await?;
    Ok((StatusCode::OK, Json(prefs)))
}

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub user_id: String,
    pub audio_speed: f64,
    pub volume: f64,
}

pub async fn put_preferences_handler(
    State(state): State<AppState>,
    Json(payload): Json<PreferencesRequest>,
) -> Result<impl IntoResponse, VoxpassError> {
    if !(0.0..=1.0).contains(&payload.volume) {
        return Err(VoxpassError::ValidationError(
            "volume must be between 0.0 and 1.0".to_string(),
        ));
    }
    if !(0.5..=2.0).contains(&payload.audio_speed) {
        return Err(VoxpassError::ValidationError(
            "audio_speed must be between 0.5 and 2.0".to_string(),
        ));
    }

    let prefs = state
        .repo
        .upsert_preferences(&payload.user_id, payload.audio_speed, payload.volume)
        .await?;

    Ok((StatusCode::OK, Json(prefs)))
}

pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, VoxpassError> {
    crate::db::health_check(state.repo.pool())
        .await
        .map_err(|e| VoxpassError::DatabaseError(e.to_string()))?;

    Ok((StatusCode::OK, Json(serde_json::json!({"status": "ok"}))))
}
