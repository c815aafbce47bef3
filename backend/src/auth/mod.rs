//! Admin gate for the editor.
//!
//! A password login issues an expiring session token. Every gated request
//! presents the token and is validated here on the server. The password
//! comparison is constant-time to mitigate timing attacks.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use crate::errors::{codes, AppError, ErrorDetails, ErrorResponse};

/// Header carrying the session token when no bearer token is sent.
pub const SESSION_HEADER: &str = "x-session-token";

/// A token handed out on successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates admin session tokens.
pub struct SessionStore {
    password: Option<String>,
    ttl: chrono::Duration,
    sessions: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    pub fn new(password: Option<String>, ttl: Duration) -> Self {
        Self {
            password,
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365)),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Whether a password is configured. Without one the gate stays open.
    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    /// Check the password and start a session.
    pub async fn login(&self, password: &str) -> Result<AdminSession, AppError> {
        let Some(expected) = self.password.as_deref() else {
            return Err(AppError::Unauthorized(
                "Admin login is not configured".to_string(),
            ));
        };
        if !constant_time_compare(password, expected) {
            tracing::warn!("Rejected admin login attempt");
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }

        let session = AdminSession {
            token: uuid::Uuid::new_v4().simple().to_string(),
            expires_at: Utc::now() + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.insert(session.token.clone(), session.expires_at);
        tracing::info!("Admin session started, expires at {}", session.expires_at);

        Ok(session)
    }

    /// Expiry of a live token. Expired tokens are dropped.
    pub async fn validate(&self, token: &str) -> Option<DateTime<Utc>> {
        let expires_at = *self.sessions.read().await.get(token)?;
        if expires_at > Utc::now() {
            return Some(expires_at);
        }
        self.sessions.write().await.remove(token);
        None
    }

    /// End a session. Returns false for unknown tokens.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

/// Session-token authentication layer for gated routes.
pub async fn admin_auth_layer(
    sessions: std::sync::Arc<SessionStore>,
    request: Request,
    next: Next,
) -> Response {
    // If no password is configured, allow all requests (dev mode)
    if !sessions.is_enabled() {
        return next.run(request).await;
    }

    let Some(token) = presented_token(request.headers()) else {
        return unauthorized_response("Missing session token");
    };
    if sessions.validate(&token).await.is_none() {
        return unauthorized_response("Session expired or invalid");
    }

    next.run(request).await
}

/// Token from the `Authorization: Bearer` header or the session header.
pub fn presented_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .or_else(|| headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
