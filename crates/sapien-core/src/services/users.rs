use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{NewUser, User, UserChanges, normalize_email};
use crate::error::DomainError;
use crate::ports::{PasswordService, UserRepository};
use crate::query::{Page, PageRequest, UserSortField};

use super::or_not_found;

const ENTITY: &str = "User";
const DUPLICATE_MESSAGE: &str = "User with this email or username already exists";

/// User accounts and profile management.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    pub async fn list(
        &self,
        sort: UserSortField,
        page: PageRequest,
    ) -> Result<Page<User>, DomainError> {
        let (items, total) = self.users.list(sort, page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User, DomainError> {
        let email = normalize_email(email);
        self.users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, email))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, DomainError> {
        let username = username.trim();
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, username))
    }

    /// Register a user. Email and username must both be unused.
    pub async fn create(&self, input: NewUser) -> Result<User, DomainError> {
        let email = normalize_email(&input.email);
        if self
            .users
            .find_conflicting(Some(&email), Some(&input.username), None)
            .await?
            .is_some()
        {
            return Err(DomainError::Duplicate(DUPLICATE_MESSAGE.to_string()));
        }

        let password_hash = self
            .passwords
            .hash(&input.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = self.users.insert(User::new(input, password_hash)).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Update profile fields. Passwords cannot be changed here.
    pub async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;

        let email = changes
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|email| *email != user.email);
        let username = changes
            .username
            .as_deref()
            .filter(|username| *username != user.username);

        if (email.is_some() || username.is_some())
            && self
                .users
                .find_conflicting(email.as_deref(), username, Some(id))
                .await?
                .is_some()
        {
            return Err(DomainError::Duplicate(DUPLICATE_MESSAGE.to_string()));
        }

        user.apply_changes(changes);
        self.users
            .update(user)
            .await
            .map_err(or_not_found(ENTITY, id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.users
            .delete(id)
            .await
            .map_err(or_not_found(ENTITY, id))?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    pub async fn search(&self, term: &str, page: PageRequest) -> Result<Page<User>, DomainError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(DomainError::BadRequest("Search query is required".to_string()));
        }
        let (items, total) = self.users.search(term, page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn touch_last_login(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .touch_last_login(id, Utc::now())
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }
}
