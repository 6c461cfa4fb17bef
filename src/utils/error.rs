use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::store::StoreError;
use crate::identity::AuthError;

#[derive(Debug)]
pub enum VoxpassError {
    DatabaseError(String),
    NotFound(String),
    ValidationError(String),
    Unauthorized(String),
    ConfigError(String),
    SerdeError(serde_json::Error),
    Internal(String),
}

impl std::fmt::Display for VoxpassError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoxpassError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            VoxpassError::NotFound(msg) => write!(f, "Not found: {}", msg),
            VoxpassError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            VoxpassError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            VoxpassError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            VoxpassError::SerdeError(err) => write!(f, "Serde error: {}", err),
            VoxpassError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for VoxpassError {}

impl IntoResponse for VoxpassError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            VoxpassError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            VoxpassError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            VoxpassError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            VoxpassError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            VoxpassError::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            VoxpassError::SerdeError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            VoxpassError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for VoxpassError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => VoxpassError::NotFound("row not found".to_string()),
            other => VoxpassError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for VoxpassError {
    fn from(err: serde_json::Error) -> Self {
        VoxpassError::SerdeError(err)
    }
}

impl From<StoreError> for VoxpassError {
    fn from(err: StoreError) -> Self {
        VoxpassError::DatabaseError(err.to_string())
    }
}

impl From<AuthError> for VoxpassError {
    fn from(err: AuthError) -> Self {
        VoxpassError::Unauthorized(err.to_string())
    }
}

impl From<config::ConfigError> for VoxpassError {
    fn from(err: config::ConfigError) -> Self {
        VoxpassError::ConfigError(err.to_string())
    }
}
