use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewPrompt, Prompt, PromptChanges, PromptCounter, PromptPatch};
use crate::error::DomainError;
use crate::ports::PromptRepository;
use crate::query::{
    DEFAULT_CATEGORY_LIMIT, DEFAULT_POPULAR_LIMIT, MAX_LIMIT, Page, PageRequest, PromptFilter,
    PromptSort,
};

use super::or_not_found;

const ENTITY: &str = "Prompt";

/// Prompt publishing, discovery, and engagement counters.
pub struct PromptService {
    prompts: Arc<dyn PromptRepository>,
}

impl PromptService {
    pub fn new(prompts: Arc<dyn PromptRepository>) -> Self {
        Self { prompts }
    }

    pub async fn list(
        &self,
        filter: &PromptFilter,
        sort: PromptSort,
        page: PageRequest,
    ) -> Result<Page<Prompt>, DomainError> {
        let (items, total) = self.prompts.list(filter, sort, page).await?;
        Ok(Page::new(items, page, total))
    }

    /// Fetch a prompt for display. Every call counts as one view.
    pub async fn get(&self, id: Uuid) -> Result<Prompt, DomainError> {
        self.prompts
            .increment(id, PromptCounter::Views)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    /// Fetch a prompt without touching its counters.
    pub async fn find(&self, id: Uuid) -> Result<Prompt, DomainError> {
        self.prompts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    pub async fn create(&self, input: NewPrompt) -> Result<Prompt, DomainError> {
        let prompt = self.prompts.insert(Prompt::new(input)).await?;
        tracing::info!(prompt_id = %prompt.id, category = %prompt.category, "Prompt created");
        Ok(prompt)
    }

    /// Full update. Counters are left alone, so likes and views recorded
    /// while the update is in flight are kept.
    pub async fn update(&self, id: Uuid, changes: PromptChanges) -> Result<Prompt, DomainError> {
        let prompt = self
            .prompts
            .update_fields(id, changes)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        tracing::debug!(prompt_id = %id, version = prompt.version, "Prompt updated");
        Ok(prompt)
    }

    pub async fn patch(&self, id: Uuid, patch: PromptPatch) -> Result<Prompt, DomainError> {
        self.prompts
            .patch_fields(id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    /// Add a like; returns the new like count.
    pub async fn like(&self, id: Uuid) -> Result<i64, DomainError> {
        self.bump(id, PromptCounter::Likes).await
    }

    /// Record a use; returns the new use count.
    pub async fn record_use(&self, id: Uuid) -> Result<i64, DomainError> {
        self.bump(id, PromptCounter::Uses).await
    }

    async fn bump(&self, id: Uuid, counter: PromptCounter) -> Result<i64, DomainError> {
        let prompt = self
            .prompts
            .increment(id, counter)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        Ok(prompt.counter(counter))
    }

    /// Soft delete by default; `permanent` removes the record and returns `None`.
    pub async fn delete(&self, id: Uuid, permanent: bool) -> Result<Option<Prompt>, DomainError> {
        if permanent {
            self.prompts
                .delete(id)
                .await
                .map_err(or_not_found(ENTITY, id))?;
            tracing::info!(prompt_id = %id, "Prompt permanently deleted");
            return Ok(None);
        }

        let prompt = self
            .prompts
            .deactivate(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        tracing::info!(prompt_id = %id, "Prompt deactivated");
        Ok(Some(prompt))
    }

    pub async fn by_category(
        &self,
        category: &str,
        limit: Option<u64>,
    ) -> Result<Vec<Prompt>, DomainError> {
        let limit = limit.unwrap_or(DEFAULT_CATEGORY_LIMIT).clamp(1, MAX_LIMIT);
        Ok(self.prompts.find_by_category(category.trim(), limit).await?)
    }

    pub async fn by_tag(&self, tag: &str) -> Result<Vec<Prompt>, DomainError> {
        Ok(self.prompts.find_by_tag(&tag.trim().to_lowercase()).await?)
    }

    pub async fn popular(&self, limit: Option<u64>) -> Result<Vec<Prompt>, DomainError> {
        let limit = limit.unwrap_or(DEFAULT_POPULAR_LIMIT).clamp(1, MAX_LIMIT);
        Ok(self.prompts.popular(limit).await?)
    }

    pub async fn categories(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.prompts.categories().await?)
    }

    pub async fn tags(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.prompts.tags().await?)
    }

    /// Active prompts, newest first.
    pub async fn recent(&self, page: PageRequest) -> Result<Page<Prompt>, DomainError> {
        let filter = PromptFilter {
            is_active: Some(true),
            ..Default::default()
        };
        self.list(&filter, PromptSort::default(), page).await
    }

    pub async fn search(&self, query: &str, page: PageRequest) -> Result<Page<Prompt>, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::BadRequest("Search query is required".to_string()));
        }
        let (items, total) = self.prompts.search(query, page).await?;
        Ok(Page::new(items, page, total))
    }
}
