//! Authentication service

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use blog_core::{AuthTokens, BlogStore, User, UserRegistration};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const TOKEN_TTL_HOURS: i64 = 24;

pub struct AuthService {
    store: Arc<dyn BlogStore>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(store: Arc<dyn BlogStore>, jwt_secret: String) -> Self {
        Self { store, jwt_secret }
    }

    /// Hash a password for storage
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(hash)
    }

    pub async fn register(&self, registration: &UserRegistration) -> Result<(User, AuthTokens)> {
        // Hash password
        let password_hash = Self::hash_password(&registration.password)?;

        let mut user = User::new(
            registration.username.clone(),
            password_hash,
            registration.nickname.clone(),
        );
        if let Some(email) = &registration.email {
            user.email = email.clone();
        }

        // The store enforces username uniqueness atomically
        let user = self.store.create_user(&user).await?;

        let tokens = self.generate_tokens(user.id)?;
        Ok((user, tokens))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(User, AuthTokens)> {
        let user = self.store.get_user_by_username(username).await?;

        if let Some(user) = user {
            // Verify password
            let parsed_hash = PasswordHash::new(&user.password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
            let argon2 = Argon2::default();

            if argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
            {
                let tokens = self.generate_tokens(user.id)?;
                return Ok((user, tokens));
            }
        }

        // Same failure for unknown user and wrong password
        anyhow::bail!("Invalid credentials")
    }

    pub async fn validate_token(&self, token: &str) -> Result<i64> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims.sub.parse()?)
    }

    fn generate_tokens(&self, user_id: i64) -> Result<AuthTokens> {
        let now = Utc::now();
        let exp = now + Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(AuthTokens {
            access_token,
            expires_in: TOKEN_TTL_HOURS * 3600,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id
    exp: i64,    // expiration time
    iat: i64,    // issued at
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_password_hash_roundtrip() {
        let hash = AuthService::hash_password("hunter2").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();

        assert!(Argon2::default()
            .verify_password(b"hunter2", &parsed)
            .is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }

    #[tokio::test]
    async fn test_token_roundtrip() {
        let service = AuthService::new(Arc::new(MemoryStore::new()), "secret".to_string());

        let tokens = service.generate_tokens(42).unwrap();
        let user_id = service.validate_token(&tokens.access_token).await.unwrap();
        assert_eq!(user_id, 42);
    }

    #[tokio::test]
    async fn test_token_rejected_with_wrong_secret() {
        let issuer = AuthService::new(Arc::new(MemoryStore::new()), "secret".to_string());
        let other = AuthService::new(Arc::new(MemoryStore::new()), "different".to_string());

        let tokens = issuer.generate_tokens(42).unwrap();
        assert!(other.validate_token(&tokens.access_token).await.is_err());
    }
}
