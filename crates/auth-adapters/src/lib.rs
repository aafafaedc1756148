//! # auth-adapters
//!
//! Argon2 + HS256 JWT implementation of `AuthProvider`.
//! Handles password hashing for registration/login and the bearer tokens
//! every authenticated request carries.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use domains::{AppError, AuthProvider, Identity, Result, Role};

/// Token payload. `sub` is the user id as a string.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

pub struct JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

impl JwtAuthProvider {
    /// `secret` signs and verifies every token; `token_ttl` is its lifetime.
    pub fn new(secret: &SecretString, token_ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            token_ttl,
        }
    }
}

fn hash_blocking(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

fn verify_blocking(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    /// Argon2 is deliberately slow; it runs on the blocking pool.
    async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let (password, hash) = (password.to_string(), hash.to_string());
        tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
            .await
            .unwrap_or(false)
    }

    fn issue_token(&self, identity: &Identity) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.user_id.to_string(),
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    fn verify_token(&self, token: &str) -> Result<Identity> {
        let invalid = || AppError::Unauthorized("Could not validate credentials".into());

        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                debug!(error = %e, "rejected bearer token");
                invalid()
            })?;
        let user_id = data.claims.sub.parse::<i64>().map_err(|_| invalid())?;

        Ok(Identity {
            user_id,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(ttl: Duration) -> JwtAuthProvider {
        JwtAuthProvider::new(&SecretString::from("test-secret"), ttl)
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let auth = provider(Duration::minutes(5));
        let hash = auth.hash_password("hunter22").await.unwrap();

        assert_ne!(hash, "hunter22");
        assert!(auth.verify_password("hunter22", &hash).await);
        assert!(!auth.verify_password("hunter23", &hash).await);
    }

    #[tokio::test]
    async fn test_malformed_hash_never_matches() {
        let auth = provider(Duration::minutes(5));
        assert!(!auth.verify_password("anything", "not-a-phc-string").await);
    }

    #[test]
    fn test_token_resolves_to_the_same_identity() {
        let auth = provider(Duration::minutes(5));
        let identity = Identity { user_id: 42, role: Role::Provider };

        let token = auth.issue_token(&identity).unwrap();
        assert_eq!(auth.verify_token(&token).unwrap(), identity);
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        // Past the default 60s leeway.
        let auth = provider(Duration::minutes(-5));
        let token = auth
            .issue_token(&Identity { user_id: 1, role: Role::User })
            .unwrap();

        assert!(matches!(auth.verify_token(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_token_from_another_secret_is_unauthorized() {
        let token = JwtAuthProvider::new(&SecretString::from("other"), Duration::minutes(5))
            .issue_token(&Identity { user_id: 1, role: Role::User })
            .unwrap();

        let err = provider(Duration::minutes(5)).verify_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(provider(Duration::minutes(5)).verify_token("garbage").is_err());
    }
}
