use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a user signs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMode {
    #[default]
    Email,
    Github,
}

impl LoginMode {
    pub const ALL: [LoginMode; 2] = [LoginMode::Email, LoginMode::Github];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoginMode::Email => "email",
            LoginMode::Github => "github",
        }
    }
}

impl fmt::Display for LoginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unknown login mode: {s}"))
    }
}

/// User entity - a prompt author or commenter.
///
/// The password hash never leaves the process: it is skipped on serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub avatar: String,
    pub bio: String,
    pub last_login: DateTime<Utc>,
    pub login_mode: LoginMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub avatar: String,
    pub bio: String,
    pub login_mode: LoginMode,
}

/// Profile fields that may change after signup. Passwords are not part of it.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub login_mode: Option<LoginMode>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(input: NewUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            username: input.username,
            email: normalize_email(&input.email),
            password_hash,
            avatar: input.avatar,
            bio: input.bio,
            last_login: now,
            login_mode: input.login_mode,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_changes(&mut self, changes: UserChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(email) = changes.email {
            self.email = normalize_email(&email);
        }
        if let Some(avatar) = changes.avatar {
            self.avatar = avatar;
        }
        if let Some(bio) = changes.bio {
            self.bio = bio;
        }
        if let Some(mode) = changes.login_mode {
            self.login_mode = mode;
        }
        self.updated_at = Utc::now();
    }

    /// Public author fields shown next to comments.
    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Emails are stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Author fields joined into comment listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub avatar: String,
}
