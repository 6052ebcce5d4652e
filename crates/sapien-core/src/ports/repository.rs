use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Comment, CommentView, LoginMode, Prompt, PromptChanges, PromptCounter, PromptPatch, User,
};
use crate::error::RepoError;
use crate::query::{CommentSortField, PageRequest, PromptFilter, PromptSort, UserSortField};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. `RepoError::NotFound` when it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Find the account registered for this email under a given login mode.
    async fn find_by_login(
        &self,
        email: &str,
        mode: LoginMode,
    ) -> Result<Option<User>, RepoError>;

    /// Find any other user already holding this email or username.
    async fn find_conflicting(
        &self,
        email: Option<&str>,
        username: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<Option<User>, RepoError>;

    /// One page of users sorted descending by `sort`, plus the total count.
    async fn list(
        &self,
        sort: UserSortField,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), RepoError>;

    /// Case-insensitive substring match on name or username.
    async fn search(&self, term: &str, page: PageRequest) -> Result<(Vec<User>, u64), RepoError>;

    async fn touch_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}

/// Prompt repository.
#[async_trait]
pub trait PromptRepository: BaseRepository<Prompt, Uuid> {
    async fn list(
        &self,
        filter: &PromptFilter,
        sort: PromptSort,
        page: PageRequest,
    ) -> Result<(Vec<Prompt>, u64), RepoError>;

    /// Active prompts matching the text index, best match first.
    async fn search(&self, text: &str, page: PageRequest) -> Result<(Vec<Prompt>, u64), RepoError>;

    /// Atomically add one to a counter and return the updated prompt.
    async fn increment(
        &self,
        id: Uuid,
        counter: PromptCounter,
    ) -> Result<Option<Prompt>, RepoError>;

    /// Write only the supplied fields. Counters are never written, and the
    /// version goes up by one when the new content differs from the stored
    /// content, evaluated against the row as it is at write time.
    async fn update_fields(
        &self,
        id: Uuid,
        changes: PromptChanges,
    ) -> Result<Option<Prompt>, RepoError>;

    /// Write only the fields present in an allow-listed patch.
    async fn patch_fields(&self, id: Uuid, patch: PromptPatch)
    -> Result<Option<Prompt>, RepoError>;

    /// Soft delete: flip `is_active` off and return the updated prompt.
    async fn deactivate(&self, id: Uuid) -> Result<Option<Prompt>, RepoError>;

    /// Active prompts in a category, newest first.
    async fn find_by_category(&self, category: &str, limit: u64)
    -> Result<Vec<Prompt>, RepoError>;

    /// Active prompts carrying a (lowercase) tag, newest first.
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Prompt>, RepoError>;

    /// Active prompts ordered by likes, then views.
    async fn popular(&self, limit: u64) -> Result<Vec<Prompt>, RepoError>;

    async fn categories(&self) -> Result<Vec<String>, RepoError>;

    async fn tags(&self) -> Result<Vec<String>, RepoError>;

    async fn count_active(&self) -> Result<u64, RepoError>;
}

/// Comment repository. Listing methods return joined views.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// All comments, newest first, with author and prompt joined.
    async fn list(&self, page: PageRequest) -> Result<(Vec<CommentView>, u64), RepoError>;

    /// Comments on a prompt with the author joined.
    async fn list_by_prompt(
        &self,
        prompt_id: Uuid,
        sort: CommentSortField,
        page: PageRequest,
    ) -> Result<(Vec<CommentView>, u64), RepoError>;

    /// Comments by a user with the prompt joined, newest first.
    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<CommentView>, u64), RepoError>;

    /// A single comment with author and prompt joined.
    async fn find_view(&self, id: Uuid) -> Result<Option<CommentView>, RepoError>;

    /// Comments on a prompt, optionally only those created since `since`.
    async fn count_for_prompt(
        &self,
        prompt_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}
