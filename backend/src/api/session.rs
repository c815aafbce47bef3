//! Admin session endpoints.

use axum::{extract::State, http::HeaderMap, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::auth::{presented_token, AdminSession};
use crate::errors::AppError;
use crate::AppState;

/// Request body for logging in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// State of the caller's admin session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub gate_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /api/auth/login - Exchange the admin password for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<AdminSession> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.sessions.login(&request.password).await {
        Ok(session) => success(session, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/auth/logout - Revoke the presented session token.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match presented_token(&headers) {
        Some(token) => {
            state.sessions.revoke(&token).await;
            success((), revision_id)
        }
        None if !state.sessions.is_enabled() => success((), revision_id),
        None => error(
            AppError::Unauthorized("Missing session token".to_string()),
            revision_id,
        ),
    }
}

/// GET /api/auth/session - Describe the caller's session.
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<SessionInfo> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let expires_at = match presented_token(&headers) {
        Some(token) => state.sessions.validate(&token).await,
        None => None,
    };

    success(
        SessionInfo {
            gate_enabled: state.sessions.is_enabled(),
            expires_at,
        },
        revision_id,
    )
}
