use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Comment, CommentView};
use crate::error::DomainError;
use crate::ports::{CommentRepository, PromptRepository, UserRepository};
use crate::query::{CommentSortField, Page, PageRequest};

use super::or_not_found;

const ENTITY: &str = "Comment";

/// Comment totals for one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommentStats {
    pub total: u64,
    /// Comments created in the last 24 hours.
    pub recent: u64,
}

/// Comment threads on prompts.
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
    prompts: Arc<dyn PromptRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
        prompts: Arc<dyn PromptRepository>,
    ) -> Self {
        Self {
            comments,
            users,
            prompts,
        }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<CommentView>, DomainError> {
        let (items, total) = self.comments.list(page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn list_by_prompt(
        &self,
        prompt_id: Uuid,
        sort: CommentSortField,
        page: PageRequest,
    ) -> Result<Page<CommentView>, DomainError> {
        let (items, total) = self.comments.list_by_prompt(prompt_id, sort, page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<CommentView>, DomainError> {
        let (items, total) = self.comments.list_by_user(user_id, page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<CommentView, DomainError> {
        self.comments
            .find_view(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    /// Post a comment. Both the author and the prompt must exist.
    pub async fn create(
        &self,
        user_id: Uuid,
        prompt_id: Uuid,
        content: &str,
    ) -> Result<CommentView, DomainError> {
        let (user, prompt) = futures::try_join!(
            self.users.find_by_id(user_id),
            self.prompts.find_by_id(prompt_id)
        )?;
        let user = user.ok_or_else(|| DomainError::not_found("User", user_id))?;
        let prompt = prompt.ok_or_else(|| DomainError::not_found("Prompt", prompt_id))?;

        let comment = self
            .comments
            .insert(Comment::new(user_id, prompt_id, content))
            .await?;
        tracing::info!(comment_id = %comment.id, prompt_id = %prompt_id, "Comment created");

        Ok(CommentView::new(
            comment,
            Some(user.summary()),
            Some(prompt.summary()),
        ))
    }

    /// Replace a comment's content and mark it edited.
    pub async fn update(&self, id: Uuid, content: &str) -> Result<CommentView, DomainError> {
        let mut comment = self
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;

        comment.edit(content);
        self.comments
            .update(comment)
            .await
            .map_err(or_not_found(ENTITY, id))?;

        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.comments
            .delete(id)
            .await
            .map_err(or_not_found(ENTITY, id))?;
        tracing::info!(comment_id = %id, "Comment deleted");
        Ok(())
    }

    pub async fn stats(&self, prompt_id: Uuid) -> Result<CommentStats, DomainError> {
        let since = Utc::now() - Duration::hours(24);
        let (total, recent) = futures::try_join!(
            self.comments.count_for_prompt(prompt_id, None),
            self.comments.count_for_prompt(prompt_id, Some(since))
        )?;
        Ok(CommentStats { total, recent })
    }
}
