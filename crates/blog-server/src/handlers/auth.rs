//! Authentication handlers

use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use blog_core::{StoreError, User, UserLogin, UserRegistration};
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    access_token: String,
    expires_in: i64,
    user: User,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<UserLogin>,
) -> Result<Json<AuthResponse>, StatusCode> {
    info!("Login attempt for: {}", req.username);

    let (user, tokens) = state
        .auth_service
        .login(&req.username, &req.password)
        .await
        .map_err(|e| {
            error!("Login error: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

    info!("Login successful for: {}", req.username);

    Ok(Json(AuthResponse {
        access_token: tokens.access_token,
        expires_in: tokens.expires_in,
        user,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<UserRegistration>,
) -> Result<Json<AuthResponse>, StatusCode> {
    info!("Registration attempt for: {}", req.username);

    if req.username.is_empty() || req.password.is_empty() || req.nickname.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Validate password length
    if req.password.len() < 6 {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.auth_service.register(&req).await {
        Ok((user, tokens)) => {
            info!("Registration successful for: {}", req.username);
            Ok(Json(AuthResponse {
                access_token: tokens.access_token,
                expires_in: tokens.expires_in,
                user,
            }))
        }
        Err(e) => {
            if matches!(
                e.downcast_ref::<StoreError>(),
                Some(StoreError::UsernameTaken(_))
            ) {
                return Err(StatusCode::CONFLICT);
            }
            error!("Registration error: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
