//! Authentication service: password verification and token issuance

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{NewUser, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by email and password, returning a signed token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !verify_password(password, &user.password_hash) {
            tracing::warn!(user_id = user.id, "Failed login attempt");
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let claims = claims_for(&user, self.config.jwt_expiration_hours, Utc::now());
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {}", e)))?;

        tracing::info!(user_id = user.id, role = %user.role, "User logged in");
        Ok((token, user))
    }

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create the configured librarian account if it does not exist yet
    pub async fn ensure_bootstrap_librarian(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (
            self.config.bootstrap_email.as_deref(),
            self.config.bootstrap_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.repository.users.get_by_email(email).await?.is_some() {
            return Ok(());
        }

        let id = self
            .repository
            .users
            .create(&NewUser {
                lastname: "Admin".to_string(),
                firstname: "Library".to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
                role: Role::Librarian,
            })
            .await?;

        tracing::info!(user_id = id, email, "Bootstrap librarian account created");
        Ok(())
    }
}

/// Claims of a token issued to `user` at `now`
pub fn claims_for(user: &User, expiration_hours: u64, now: DateTime<Utc>) -> UserClaims {
    UserClaims {
        sub: user.email.clone(),
        user_id: user.id,
        role: user.role,
        exp: (now + Duration::hours(expiration_hours as i64)).timestamp(),
        iat: now.timestamp(),
    }
}

/// Hash a password with argon2 and a random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored argon2 hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
