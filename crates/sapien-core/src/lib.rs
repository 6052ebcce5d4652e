//! # Sapien Core
//!
//! The domain layer of the Sapien prompt-sharing backend.
//! This crate contains entities, repository ports, query types, and the
//! service layer, with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod query;
pub mod services;

pub use error::{DomainError, FieldError, RepoError};
