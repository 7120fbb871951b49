//! User handlers

use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use blog_core::User;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    users: Vec<User>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<UserListResponse>, StatusCode> {
    match state.store.list_users().await {
        Ok(users) => Ok(Json(UserListResponse { users })),
        Err(e) => {
            tracing::error!("Failed to list users: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
