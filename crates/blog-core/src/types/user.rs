//! User types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store on insert, monotonically increasing
    pub id: i64,
    pub username: String,
    /// Argon2 hash, never serialized into responses
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
    pub nickname: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String, nickname: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username,
            password_hash,
            email: String::new(),
            nickname,
            avatar: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegistration {
    pub username: String,
    pub password: String,
    pub nickname: String,
    pub email: Option<String>,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLogin {
    pub username: String,
    pub password: String,
}

/// Authentication token returned by login/register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub expires_in: i64,
}
