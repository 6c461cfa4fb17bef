use axum::{Router, middleware, routing};

use super::AppState;
use super::handlers::{
    access_summary_handler, add_bookmark_handler, check_access_handler,
    complete_referral_handler, create_referral_handler, derive_fingerprint_handler,
    finish_history_handler, get_preferences_handler, health_handler, list_bookmarks_handler,
    put_preferences_handler, record_access_handler, referral_stats_handler,
    remove_bookmark_handler, tour_history_handler, validate_invite_handler,
};
use super::middleware::api_key_auth;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/access/check", routing::post(check_access_handler))
        .route("/access/record", routing::post(record_access_handler))
        .route("/access/summary", routing::post(access_summary_handler))
        .route("/fingerprint", routing::post(derive_fingerprint_handler))
        .route("/invites/validate", routing::post(validate_invite_handler))
        .route("/referrals", routing::post(create_referral_handler))
        .route("/referrals/complete", routing::post(complete_referral_handler))
        .route("/referrals/:user_id/stats", routing::get(referral_stats_handler))
        .route("/history/:user_id", routing::get(tour_history_handler))
        .route("/history", routing::post(finish_history_handler))
        .route("/bookmarks/:user_id", routing::get(list_bookmarks_handler))
        .route("/bookmarks", routing::post(add_bookmark_handler))
        .route(
            "/bookmarks/:user_id/:tour_id",
            routing::delete(remove_bookmark_handler),
        )
        .route("/preferences/:user_id", routing::get(get_preferences_handler))
        .route("/preferences", routing::put(put_preferences_handler))
        .route_layer(middleware::from_fn_with_state(
            state.api_key.clone(),
            api_key_auth,
        ))
        .route("/health", routing::get(health_handler))
        .with_state(state)
}
