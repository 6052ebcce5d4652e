//! Application services - one per entity, composed over the repository ports.
//!
//! Services own query construction (filters, paging, sort resolution) and the
//! business rules that span repository calls (duplicate checks, version
//! bumping, referential checks). They never see HTTP types.

mod auth;
mod comments;
mod home;
mod prompts;
mod users;

pub use auth::AuthService;
pub use comments::{CommentService, CommentStats};
pub use home::{HomeService, HomeStats};
pub use prompts::PromptService;
pub use users::UserService;

use uuid::Uuid;

use crate::error::{DomainError, RepoError};

/// Map a repository miss onto a named not-found error.
pub(crate) fn or_not_found(entity: &'static str, id: Uuid) -> impl FnOnce(RepoError) -> DomainError {
    move |err| match err {
        RepoError::NotFound => DomainError::not_found(entity, id),
        other => other.into(),
    }
}
