//! # Accounts
//!
//! Registration, login and profile management. Password hashing and token
//! handling are delegated to the configured `AuthProvider`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use domains::{
    AppError, AuthProvider, Clock, Identity, NewUser, Result, Role, User, UserPatch, UserRepo,
};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub mobile: Option<String>,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
    pub user_id: i64,
    pub name: String,
}

pub struct AccountService {
    users: Arc<dyn UserRepo>,
    auth: Arc<dyn AuthProvider>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepo>, auth: Arc<dyn AuthProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { users, auth, clock }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        let name = request.name.trim();
        let email = request.email.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("name must not be empty".into()));
        }
        if !is_plausible_email(email) {
            return Err(AppError::ValidationError("email address is not valid".into()));
        }
        if request.password.is_empty() {
            return Err(AppError::ValidationError("password must not be empty".into()));
        }

        if self.users.find_credentials(email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let password_hash = self.auth.hash_password(&request.password).await?;
        let user = self
            .users
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role: request.role,
                mobile: request.mobile,
                age: request.age,
                location: request.location,
                bio: request.bio,
                created_at: self.clock.now(),
            })
            .await?;

        info!(user_id = user.id, role = %user.role, "account registered");
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthToken> {
        let invalid = || AppError::Unauthorized("Invalid email or password".into());

        let Some((user, password_hash)) = self.users.find_credentials(request.email.trim()).await? else {
            warn!("login attempt for unknown email");
            return Err(invalid());
        };
        if !self.auth.verify_password(&request.password, &password_hash).await {
            warn!(user_id = user.id, "login attempt with wrong password");
            return Err(invalid());
        }

        let access_token = self.auth.issue_token(&Identity {
            user_id: user.id,
            role: user.role,
        })?;
        Ok(AuthToken {
            access_token,
            token_type: "bearer".into(),
            role: user.role,
            user_id: user.id,
            name: user.name,
        })
    }

    pub async fn me(&self, identity: &Identity) -> Result<User> {
        self.get_user(identity.user_id).await
    }

    pub async fn update_me(&self, identity: &Identity, patch: UserPatch) -> Result<User> {
        let mut user = self.get_user(identity.user_id).await?;
        patch.apply(&mut user);
        if user.name.trim().is_empty() {
            return Err(AppError::ValidationError("name must not be empty".into()));
        }
        self.users.update_user(user).await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))
    }

    pub async fn list_providers(&self, location: Option<String>) -> Result<Vec<User>> {
        self.users.list_providers(location).await
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
