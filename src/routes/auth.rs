// SPDX-License-Identifier: MIT

//! Operator session routes.
//!
//! The application has exactly one operator. Login checks the supplied
//! password against a SHA-256 digest from configuration and issues a JWT,
//! delivered both as an HttpOnly cookie and in the response body.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser, SESSION_COOKIE};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Routes that need the session middleware applied.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Exchange the operator password for a session token.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let digest = Sha256::digest(payload.password.as_bytes());
    let supplied = hex::encode(digest);

    // Constant-time comparison over the hex digests.
    let matches: bool = supplied
        .as_bytes()
        .ct_eq(state.config.operator_password_sha256.as_bytes())
        .into();

    if !matches {
        tracing::warn!("Rejected login attempt with wrong password");
        return Err(AppError::Unauthorized);
    }

    let token = create_jwt(crate::OPERATOR_ID, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(30))
        .build();

    tracing::info!("Operator logged in");

    Ok((jar.add(cookie), Json(LoginResponse { token })))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Clear the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build();

    (jar.add(cookie), Json(LogoutResponse { success: true }))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: u64,
}

/// Identify the current session.
async fn get_me(axum::Extension(user): axum::Extension<AuthUser>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.user_id,
    })
}
