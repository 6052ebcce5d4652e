//! # Sapien Infrastructure
//!
//! Concrete implementations of the ports defined in `sapien-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//! - `minimal` - In-memory repositories only

pub mod auth;
pub mod database;
pub mod memory;

pub use auth::Argon2PasswordService;
pub use database::{DatabaseConfig, DatabaseConnections};
pub use memory::{
    InMemoryCommentRepository, InMemoryPromptRepository, InMemoryUserRepository, MemoryStore,
};

#[cfg(feature = "postgres")]
pub use database::{PostgresCommentRepository, PostgresPromptRepository, PostgresUserRepository};
