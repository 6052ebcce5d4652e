use std::sync::Arc;

use chrono::Utc;

use crate::domain::{LoginMode, User, normalize_email};
use crate::error::DomainError;
use crate::ports::{PasswordService, UserRepository};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Stateless login check. No session or token is issued.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Verify a login attempt and refresh the user's last-login stamp.
    ///
    /// Email mode checks the password against the stored hash. GitHub mode
    /// trusts the presence of a GitHub-registered account; the OAuth exchange
    /// happens upstream.
    pub async fn login(
        &self,
        email: &str,
        mode: LoginMode,
        password: Option<&str>,
    ) -> Result<User, DomainError> {
        let email = normalize_email(email);
        let found = self.users.find_by_login(&email, mode).await?;

        let user = match mode {
            LoginMode::Email => {
                let user =
                    found.ok_or_else(|| DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;
                if !self.password_matches(password.unwrap_or_default(), &user.password_hash) {
                    return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
                }
                user
            }
            LoginMode::Github => found.ok_or_else(|| DomainError::NotFound {
                entity: "GitHub user",
                id: email.clone(),
            })?,
        };

        let user = self
            .users
            .touch_last_login(user.id, Utc::now())
            .await?
            .unwrap_or(user);

        tracing::info!(user_id = %user.id, mode = %mode, "User logged in");
        Ok(user)
    }

    fn password_matches(&self, password: &str, hash: &str) -> bool {
        match self.passwords.verify(password, hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("Stored password hash could not be verified: {}", e);
                false
            }
        }
    }
}
