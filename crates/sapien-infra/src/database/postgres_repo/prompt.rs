use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Statement,
};
use uuid::Uuid;

use sapien_core::domain::{
    DEFAULT_AUTHOR, Prompt, PromptChanges, PromptCounter, PromptPatch, normalize_tags,
};
use sapien_core::error::RepoError;
use sapien_core::ports::PromptRepository;
use sapien_core::query::{
    PageRequest, PromptFilter, PromptSort, PromptSortField, SortOrder, build_tsquery,
};

use super::{PostgresPromptRepository, fetch_page};
use crate::database::entity::prompt::{self, DbResultType, Entity as PromptEntity, model_names};
use crate::database::postgres_base::map_db_err;

/// Text search document. Matches the expression indexed by the migration.
const SEARCH_DOCUMENT: &str = "prompt_search_document(title, description, tags)";

fn text_match(tsquery: String) -> SimpleExpr {
    Expr::cust_with_values(
        format!("{SEARCH_DOCUMENT} @@ to_tsquery('english', $1)"),
        [tsquery],
    )
}

fn text_rank(tsquery: String) -> SimpleExpr {
    Expr::cust_with_values(
        format!("ts_rank({SEARCH_DOCUMENT}, to_tsquery('english', $1))"),
        [tsquery],
    )
}

fn sort_column(field: PromptSortField) -> prompt::Column {
    match field {
        PromptSortField::CreatedAt => prompt::Column::CreatedAt,
        PromptSortField::UpdatedAt => prompt::Column::UpdatedAt,
        PromptSortField::Title => prompt::Column::Title,
        PromptSortField::Category => prompt::Column::Category,
        PromptSortField::Likes => prompt::Column::Likes,
        PromptSortField::Views => prompt::Column::Views,
        PromptSortField::Uses => prompt::Column::Uses,
        PromptSortField::Version => prompt::Column::Version,
    }
}

fn counter_column(counter: PromptCounter) -> prompt::Column {
    match counter {
        PromptCounter::Views => prompt::Column::Views,
        PromptCounter::Likes => prompt::Column::Likes,
        PromptCounter::Uses => prompt::Column::Uses,
    }
}

fn filtered(filter: &PromptFilter) -> Select<PromptEntity> {
    let mut query = PromptEntity::find();

    if let Some(category) = &filter.category {
        query = query.filter(prompt::Column::Category.eq(category.as_str()));
    }
    if !filter.tags.is_empty() {
        query = query.filter(Expr::cust_with_values("tags && $1", [filter.tags.clone()]));
    }
    if let Some(result_type) = filter.result_type {
        query = query.filter(prompt::Column::ResultType.eq(DbResultType::from(result_type)));
    }
    if !filter.works_best_with.is_empty() {
        let models = model_names(&filter.works_best_with);
        query = query.filter(Expr::cust_with_values("works_best_with && $1", [models]));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(prompt::Column::IsActive.eq(is_active));
    }
    if let Some(tsquery) = filter.search.as_deref().and_then(build_tsquery) {
        query = query.filter(text_match(tsquery));
    }

    query
}

/// Adds one to `version` when the incoming content differs from the stored
/// content. Evaluated against the pre-update row.
fn version_bump(content: &str) -> SimpleExpr {
    Expr::cust_with_values(
        "version + CASE WHEN content IS DISTINCT FROM $1 THEN 1 ELSE 0 END",
        [content.to_string()],
    )
}

fn active() -> Select<PromptEntity> {
    PromptEntity::find().filter(prompt::Column::IsActive.eq(true))
}

#[async_trait]
impl PromptRepository for PostgresPromptRepository {
    async fn list(
        &self,
        filter: &PromptFilter,
        sort: PromptSort,
        page: PageRequest,
    ) -> Result<(Vec<Prompt>, u64), RepoError> {
        let order = match sort.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        let query = filtered(filter)
            .order_by(sort_column(sort.field), order)
            .order_by_asc(prompt::Column::Id);

        let (models, total) = fetch_page(&self.db, query, page).await?;
        tracing::debug!(total, page = page.page, "Listed prompts");
        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn search(&self, text: &str, page: PageRequest) -> Result<(Vec<Prompt>, u64), RepoError> {
        let Some(tsquery) = build_tsquery(text) else {
            return Ok((Vec::new(), 0));
        };
        tracing::debug!(tsquery = %tsquery, "Searching prompts");

        let query = active()
            .filter(text_match(tsquery.clone()))
            .order_by(text_rank(tsquery), Order::Desc)
            .order_by_desc(prompt::Column::CreatedAt)
            .order_by_asc(prompt::Column::Id);

        let (models, total) = fetch_page(&self.db, query, page).await?;
        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn increment(
        &self,
        id: Uuid,
        counter: PromptCounter,
    ) -> Result<Option<Prompt>, RepoError> {
        let column = counter_column(counter);
        let updated = PromptEntity::update_many()
            .col_expr(column, Expr::col(column).add(1))
            .filter(prompt::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    async fn update_fields(
        &self,
        id: Uuid,
        changes: PromptChanges,
    ) -> Result<Option<Prompt>, RepoError> {
        let updated_by = changes
            .updated_by
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        let mut update = PromptEntity::update_many()
            .col_expr(prompt::Column::UpdatedBy, Expr::value(updated_by))
            .col_expr(prompt::Column::UpdatedAt, Expr::value(Utc::now()));

        if let Some(title) = changes.title {
            update = update.col_expr(prompt::Column::Title, Expr::value(title));
        }
        if let Some(description) = changes.description {
            update = update.col_expr(prompt::Column::Description, Expr::value(description));
        }
        if let Some(content) = changes.content {
            update = update
                .col_expr(prompt::Column::Version, version_bump(&content))
                .col_expr(prompt::Column::Content, Expr::value(content));
        }
        if let Some(category) = changes.category {
            update = update.col_expr(prompt::Column::Category, Expr::value(category));
        }
        if let Some(tags) = changes.tags {
            update = update.col_expr(prompt::Column::Tags, Expr::value(normalize_tags(tags)));
        }
        if let Some(cover_image) = changes.cover_image {
            update = update.col_expr(prompt::Column::CoverImage, Expr::value(cover_image));
        }
        if let Some(result_type) = changes.result_type {
            update = update.col_expr(
                prompt::Column::ResultType,
                Expr::value(DbResultType::from(result_type)),
            );
        }
        if let Some(sample_output) = changes.sample_output {
            update = update.col_expr(prompt::Column::SampleOutput, Expr::value(sample_output));
        }
        if let Some(models) = changes.works_best_with {
            update = update.col_expr(
                prompt::Column::WorksBestWith,
                Expr::value(model_names(&models)),
            );
        }
        if let Some(is_active) = changes.is_active {
            update = update.col_expr(prompt::Column::IsActive, Expr::value(is_active));
        }

        let updated = update
            .filter(prompt::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    async fn patch_fields(
        &self,
        id: Uuid,
        patch: PromptPatch,
    ) -> Result<Option<Prompt>, RepoError> {
        let mut update = PromptEntity::update_many()
            .col_expr(prompt::Column::UpdatedAt, Expr::value(Utc::now()));

        if let Some(is_active) = patch.is_active {
            update = update.col_expr(prompt::Column::IsActive, Expr::value(is_active));
        }
        if let Some(tags) = patch.tags {
            update = update.col_expr(prompt::Column::Tags, Expr::value(normalize_tags(tags)));
        }
        if let Some(updated_by) = patch.updated_by {
            update = update.col_expr(prompt::Column::UpdatedBy, Expr::value(updated_by));
        }
        if let Some(likes) = patch.likes {
            update = update.col_expr(prompt::Column::Likes, Expr::value(likes.max(0)));
        }
        if let Some(uses) = patch.uses {
            update = update.col_expr(prompt::Column::Uses, Expr::value(uses.max(0)));
        }

        let updated = update
            .filter(prompt::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<Prompt>, RepoError> {
        let updated = PromptEntity::update_many()
            .col_expr(prompt::Column::IsActive, Expr::value(false))
            .col_expr(prompt::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(prompt::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    async fn find_by_category(
        &self,
        category: &str,
        limit: u64,
    ) -> Result<Vec<Prompt>, RepoError> {
        let models = active()
            .filter(prompt::Column::Category.eq(category))
            .order_by_desc(prompt::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Prompt>, RepoError> {
        let models = active()
            .filter(Expr::cust_with_values("$1 = ANY(tags)", [tag]))
            .order_by_desc(prompt::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn popular(&self, limit: u64) -> Result<Vec<Prompt>, RepoError> {
        let models = active()
            .order_by_desc(prompt::Column::Likes)
            .order_by_desc(prompt::Column::Views)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn categories(&self) -> Result<Vec<String>, RepoError> {
        PromptEntity::find()
            .select_only()
            .column(prompt::Column::Category)
            .distinct()
            .order_by_asc(prompt::Column::Category)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn tags(&self) -> Result<Vec<String>, RepoError> {
        let rows = self
            .db
            .query_all(Statement::from_string(
                DbBackend::Postgres,
                "SELECT DISTINCT unnest(tags) AS tag FROM prompts ORDER BY tag",
            ))
            .await
            .map_err(map_db_err)?;

        rows.iter()
            .map(|row| row.try_get::<String>("", "tag").map_err(map_db_err))
            .collect()
    }

    async fn count_active(&self) -> Result<u64, RepoError> {
        active().count(&self.db).await.map_err(map_db_err)
    }
}
