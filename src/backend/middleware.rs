use axum::{
    extract::{Json, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// Shared-secret gate for the whole API: the web UI sends the deploy-time
/// key as a bearer token. Not per-user auth; user sessions are resolved
/// separately by the identity provider. The expected key comes from
/// `ServerConfig`, which already rejects an empty value at startup.
pub async fn api_key_auth(
    State(expected): State<String>,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    let provided = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(key) if key == expected => Ok(next.run(req).await),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "invalid or missing API key" })),
        )),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::{middleware, Router};
    use tower::ServiceExt;

    use super::api_key_auth;

    fn app(key: &str) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .route_layer(middleware::from_fn_with_state(key.to_string(), api_key_auth))
    }

    #[tokio::test]
    async fn rejects_missing_and_wrong_keys() {
        let missing = Request::builder().uri("/ping").body(Body::empty()).unwrap();
        let resp = app("top-secret").oneshot(missing).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let wrong = Request::builder()
            .uri("/ping")
            .header("Authorization", "Bearer not-it")
            .body(Body::empty())
            .unwrap();
        let resp = app("top-secret").oneshot(wrong).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accepts_the_configured_key() {
        let req = Request::builder()
            .uri("/ping")
            .header("Authorization", "Bearer top-secret")
            .body(Body::empty())
            .unwrap();
        let resp = app("top-secret").oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
