use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use sapien_core::domain::{Comment, CommentView};
use sapien_core::error::RepoError;
use sapien_core::ports::{BaseRepository, CommentRepository};
use sapien_core::query::{CommentSortField, PageRequest};

use super::{MemoryStore, paginate};

/// Which references to resolve when building a view.
#[derive(Clone, Copy)]
struct Join {
    user: bool,
    prompt: bool,
}

pub struct InMemoryCommentRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryCommentRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    async fn matching(&self, pred: impl Fn(&Comment) -> bool) -> Vec<Comment> {
        self.store
            .comments
            .read()
            .await
            .values()
            .filter(|c| pred(c))
            .cloned()
            .collect()
    }

    async fn views(&self, comments: Vec<Comment>, join: Join) -> Vec<CommentView> {
        let users = self.store.users.read().await;
        let prompts = self.store.prompts.read().await;

        comments
            .into_iter()
            .map(|comment| {
                let author = join
                    .user
                    .then(|| users.get(&comment.user_id).map(|u| u.summary()))
                    .flatten();
                let prompt = join
                    .prompt
                    .then(|| prompts.get(&comment.prompt_id).map(|p| p.summary()))
                    .flatten();
                CommentView::new(comment, author, prompt)
            })
            .collect()
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.comments.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.store.comments.write().await;
        if comments.contains_key(&entity.id) {
            return Err(RepoError::Constraint("comments_pkey".to_string()));
        }
        comments.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.store.comments.write().await;
        match comments.get_mut(&entity.id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .comments
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list(&self, page: PageRequest) -> Result<(Vec<CommentView>, u64), RepoError> {
        let mut comments = self.matching(|_| true).await;
        comments.sort_by_key(|c| Reverse(c.created_at));

        let (comments, total) = paginate(comments, page);
        let join = Join {
            user: true,
            prompt: true,
        };
        Ok((self.views(comments, join).await, total))
    }

    async fn list_by_prompt(
        &self,
        prompt_id: Uuid,
        sort: CommentSortField,
        page: PageRequest,
    ) -> Result<(Vec<CommentView>, u64), RepoError> {
        let mut comments = self.matching(|c| c.prompt_id == prompt_id).await;
        match sort {
            CommentSortField::CreatedAt => comments.sort_by_key(|c| Reverse(c.created_at)),
            CommentSortField::UpdatedAt => comments.sort_by_key(|c| Reverse(c.updated_at)),
        }

        let (comments, total) = paginate(comments, page);
        let join = Join {
            user: true,
            prompt: false,
        };
        Ok((self.views(comments, join).await, total))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<CommentView>, u64), RepoError> {
        let mut comments = self.matching(|c| c.user_id == user_id).await;
        comments.sort_by_key(|c| Reverse(c.created_at));

        let (comments, total) = paginate(comments, page);
        let join = Join {
            user: false,
            prompt: true,
        };
        Ok((self.views(comments, join).await, total))
    }

    async fn find_view(&self, id: Uuid) -> Result<Option<CommentView>, RepoError> {
        let Some(comment) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let join = Join {
            user: true,
            prompt: true,
        };
        Ok(self.views(vec![comment], join).await.into_iter().next())
    }

    async fn count_for_prompt(
        &self,
        prompt_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, RepoError> {
        let comments = self.store.comments.read().await;
        Ok(comments
            .values()
            .filter(|c| c.prompt_id == prompt_id)
            .filter(|c| since.is_none_or(|since| c.created_at >= since))
            .count() as u64)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.comments.read().await.len() as u64)
    }
}
