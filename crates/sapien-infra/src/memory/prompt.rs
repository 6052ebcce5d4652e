use std::cmp::{Ordering, Reverse};
use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use sapien_core::domain::{Prompt, PromptChanges, PromptCounter, PromptPatch};
use sapien_core::error::RepoError;
use sapien_core::ports::{BaseRepository, PromptRepository};
use sapien_core::query::{
    PageRequest, PromptFilter, PromptSort, PromptSortField, SortOrder, search_terms,
};

use super::{MemoryStore, paginate};

/// In-memory prompt repository. Counter bumps and field updates happen under
/// the write lock, so concurrent increments are never lost.
pub struct InMemoryPromptRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryPromptRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    async fn active_where(&self, pred: impl Fn(&Prompt) -> bool) -> Vec<Prompt> {
        self.store
            .prompts
            .read()
            .await
            .values()
            .filter(|p| p.is_active && pred(p))
            .cloned()
            .collect()
    }
}

/// Number of search terms found in the title, description, or tags.
fn relevance(prompt: &Prompt, terms: &[String]) -> usize {
    let document = format!(
        "{} {} {}",
        prompt.title,
        prompt.description,
        prompt.tags.join(" ")
    )
    .to_lowercase();
    let words: Vec<String> = search_terms(&document);

    terms
        .iter()
        .filter(|term| words.iter().any(|word| word.starts_with(term.as_str())))
        .count()
}

fn matches(prompt: &Prompt, filter: &PromptFilter, terms: &[String]) -> bool {
    filter.category.as_ref().is_none_or(|c| &prompt.category == c)
        && (filter.tags.is_empty() || filter.tags.iter().any(|t| prompt.tags.contains(t)))
        && filter.result_type.is_none_or(|r| prompt.result_type == r)
        && (filter.works_best_with.is_empty()
            || filter
                .works_best_with
                .iter()
                .any(|m| prompt.works_best_with.contains(m)))
        && filter.is_active.is_none_or(|a| prompt.is_active == a)
        && (terms.is_empty() || relevance(prompt, terms) > 0)
}

fn compare(a: &Prompt, b: &Prompt, field: PromptSortField) -> Ordering {
    match field {
        PromptSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        PromptSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        PromptSortField::Title => a.title.cmp(&b.title),
        PromptSortField::Category => a.category.cmp(&b.category),
        PromptSortField::Likes => a.likes.cmp(&b.likes),
        PromptSortField::Views => a.views.cmp(&b.views),
        PromptSortField::Uses => a.uses.cmp(&b.uses),
        PromptSortField::Version => a.version.cmp(&b.version),
    }
}

fn newest_first(prompts: &mut [Prompt]) {
    prompts.sort_by_key(|p| Reverse(p.created_at));
}

#[async_trait]
impl BaseRepository<Prompt, Uuid> for InMemoryPromptRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Prompt>, RepoError> {
        Ok(self.store.prompts.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: Prompt) -> Result<Prompt, RepoError> {
        let mut prompts = self.store.prompts.write().await;
        if prompts.contains_key(&entity.id) {
            return Err(RepoError::Constraint("prompts_pkey".to_string()));
        }
        prompts.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Prompt) -> Result<Prompt, RepoError> {
        let mut prompts = self.store.prompts.write().await;
        match prompts.get_mut(&entity.id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .prompts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PromptRepository for InMemoryPromptRepository {
    async fn list(
        &self,
        filter: &PromptFilter,
        sort: PromptSort,
        page: PageRequest,
    ) -> Result<(Vec<Prompt>, u64), RepoError> {
        let terms = filter.search.as_deref().map(search_terms).unwrap_or_default();
        let mut prompts: Vec<Prompt> = self
            .store
            .prompts
            .read()
            .await
            .values()
            .filter(|p| matches(p, filter, &terms))
            .cloned()
            .collect();

        prompts.sort_by(|a, b| {
            let ord = compare(a, b, sort.field);
            match sort.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
            .then_with(|| a.id.cmp(&b.id))
        });

        Ok(paginate(prompts, page))
    }

    async fn search(&self, text: &str, page: PageRequest) -> Result<(Vec<Prompt>, u64), RepoError> {
        let terms = search_terms(text);
        if terms.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let mut ranked: Vec<(usize, Prompt)> = self
            .active_where(|_| true)
            .await
            .into_iter()
            .map(|p| (relevance(&p, &terms), p))
            .filter(|(rank, _)| *rank > 0)
            .collect();
        ranked.sort_by(|(ra, a), (rb, b)| rb.cmp(ra).then(b.created_at.cmp(&a.created_at)));

        Ok(paginate(ranked.into_iter().map(|(_, p)| p).collect(), page))
    }

    async fn increment(
        &self,
        id: Uuid,
        counter: PromptCounter,
    ) -> Result<Option<Prompt>, RepoError> {
        let mut prompts = self.store.prompts.write().await;
        Ok(prompts.get_mut(&id).map(|prompt| {
            prompt.bump(counter);
            prompt.clone()
        }))
    }

    async fn update_fields(
        &self,
        id: Uuid,
        changes: PromptChanges,
    ) -> Result<Option<Prompt>, RepoError> {
        let mut prompts = self.store.prompts.write().await;
        Ok(prompts.get_mut(&id).map(|prompt| {
            prompt.apply_changes(changes);
            prompt.clone()
        }))
    }

    async fn patch_fields(
        &self,
        id: Uuid,
        patch: PromptPatch,
    ) -> Result<Option<Prompt>, RepoError> {
        let mut prompts = self.store.prompts.write().await;
        Ok(prompts.get_mut(&id).map(|prompt| {
            prompt.apply_patch(patch);
            prompt.clone()
        }))
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<Prompt>, RepoError> {
        let mut prompts = self.store.prompts.write().await;
        Ok(prompts.get_mut(&id).map(|prompt| {
            prompt.is_active = false;
            prompt.updated_at = Utc::now();
            prompt.clone()
        }))
    }

    async fn find_by_category(
        &self,
        category: &str,
        limit: u64,
    ) -> Result<Vec<Prompt>, RepoError> {
        let mut prompts = self.active_where(|p| p.category == category).await;
        newest_first(&mut prompts);
        prompts.truncate(limit as usize);
        Ok(prompts)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Prompt>, RepoError> {
        let mut prompts = self
            .active_where(|p| p.tags.iter().any(|t| t == tag))
            .await;
        newest_first(&mut prompts);
        Ok(prompts)
    }

    async fn popular(&self, limit: u64) -> Result<Vec<Prompt>, RepoError> {
        let mut prompts = self.active_where(|_| true).await;
        prompts.sort_by_key(|p| Reverse((p.likes, p.views)));
        prompts.truncate(limit as usize);
        Ok(prompts)
    }

    async fn categories(&self) -> Result<Vec<String>, RepoError> {
        let prompts = self.store.prompts.read().await;
        let set: BTreeSet<String> = prompts.values().map(|p| p.category.clone()).collect();
        Ok(set.into_iter().collect())
    }

    async fn tags(&self) -> Result<Vec<String>, RepoError> {
        let prompts = self.store.prompts.read().await;
        let set: BTreeSet<String> = prompts
            .values()
            .flat_map(|p| p.tags.iter().cloned())
            .collect();
        Ok(set.into_iter().collect())
    }

    async fn count_active(&self) -> Result<u64, RepoError> {
        let prompts = self.store.prompts.read().await;
        Ok(prompts.values().filter(|p| p.is_active).count() as u64)
    }
}
