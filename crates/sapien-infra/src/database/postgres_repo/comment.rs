use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use sapien_core::domain::{AuthorSummary, CommentView, PromptSummary, User};
use sapien_core::error::RepoError;
use sapien_core::ports::CommentRepository;
use sapien_core::query::{CommentSortField, PageRequest};

use super::{PostgresCommentRepository, fetch_page};
use crate::database::entity::comment::{self, Entity as CommentEntity};
use crate::database::entity::prompt::{self, Entity as PromptEntity};
use crate::database::entity::user::{self, Entity as UserEntity};
use crate::database::postgres_base::map_db_err;

fn author(model: user::Model) -> AuthorSummary {
    User::from(model).summary()
}

impl PostgresCommentRepository {
    /// Load `{id, title}` for the given prompts in one query.
    async fn prompt_titles(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, PromptSummary>, RepoError> {
        let mut ids: Vec<Uuid> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, String)> = PromptEntity::find()
            .select_only()
            .column(prompt::Column::Id)
            .column(prompt::Column::Title)
            .filter(prompt::Column::Id.is_in(ids))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(id, title)| (id, PromptSummary { id, title }))
            .collect())
    }
}

fn joined(
    rows: Vec<(comment::Model, Option<user::Model>)>,
    prompts: &HashMap<Uuid, PromptSummary>,
) -> Vec<CommentView> {
    rows.into_iter()
        .map(|(model, user)| {
            let prompt = prompts.get(&model.prompt_id).cloned();
            CommentView::new(model.into(), user.map(author), prompt)
        })
        .collect()
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list(&self, page: PageRequest) -> Result<(Vec<CommentView>, u64), RepoError> {
        let query = CommentEntity::find()
            .find_also_related(UserEntity)
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id);

        let (rows, total) = fetch_page(&self.db, query, page).await?;
        let prompts = self
            .prompt_titles(rows.iter().map(|(c, _)| c.prompt_id))
            .await?;

        Ok((joined(rows, &prompts), total))
    }

    async fn list_by_prompt(
        &self,
        prompt_id: Uuid,
        sort: CommentSortField,
        page: PageRequest,
    ) -> Result<(Vec<CommentView>, u64), RepoError> {
        let column = match sort {
            CommentSortField::CreatedAt => comment::Column::CreatedAt,
            CommentSortField::UpdatedAt => comment::Column::UpdatedAt,
        };
        let query = CommentEntity::find()
            .filter(comment::Column::PromptId.eq(prompt_id))
            .find_also_related(UserEntity)
            .order_by_desc(column)
            .order_by_asc(comment::Column::Id);

        let (rows, total) = fetch_page(&self.db, query, page).await?;
        let views = rows
            .into_iter()
            .map(|(model, user)| CommentView::new(model.into(), user.map(author), None))
            .collect();

        Ok((views, total))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<CommentView>, u64), RepoError> {
        let query = CommentEntity::find()
            .filter(comment::Column::UserId.eq(user_id))
            .find_also_related(PromptEntity)
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id);

        let (rows, total) = fetch_page(&self.db, query, page).await?;
        let views = rows
            .into_iter()
            .map(|(model, prompt)| {
                let summary = prompt.map(|p| PromptSummary {
                    id: p.id,
                    title: p.title,
                });
                CommentView::new(model.into(), None, summary)
            })
            .collect();

        Ok((views, total))
    }

    async fn find_view(&self, id: Uuid) -> Result<Option<CommentView>, RepoError> {
        let Some((model, user)) = CommentEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let mut prompts = self.prompt_titles([model.prompt_id]).await?;
        let prompt = prompts.remove(&model.prompt_id);
        Ok(Some(CommentView::new(model.into(), user.map(author), prompt)))
    }

    async fn count_for_prompt(
        &self,
        prompt_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, RepoError> {
        let mut query = CommentEntity::find().filter(comment::Column::PromptId.eq(prompt_id));
        if let Some(since) = since {
            query = query.filter(comment::Column::CreatedAt.gte(since));
        }
        query.count(&self.db).await.map_err(map_db_err)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        CommentEntity::find().count(&self.db).await.map_err(map_db_err)
    }
}
