use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use sapien_core::domain::{LoginMode, User};
use sapien_core::error::RepoError;
use sapien_core::ports::UserRepository;
use sapien_core::query::{PageRequest, UserSortField, escape_like};

use super::{PostgresUserRepository, fetch_page, mask_email};
use crate::database::entity::user::{self, DbLoginMode, Entity as UserEntity};
use crate::database::postgres_base::map_db_err;

fn sort_column(field: UserSortField) -> user::Column {
    match field {
        UserSortField::CreatedAt => user::Column::CreatedAt,
        UserSortField::UpdatedAt => user::Column::UpdatedAt,
        UserSortField::Name => user::Column::Name,
        UserSortField::Username => user::Column::Username,
        UserSortField::LastLogin => user::Column::LastLogin,
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_login(
        &self,
        email: &str,
        mode: LoginMode,
    ) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), %mode, "Finding user for login");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::LoginMode.eq(DbLoginMode::from(mode)))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_conflicting(
        &self,
        email: Option<&str>,
        username: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<Option<User>, RepoError> {
        let mut any = Condition::any();
        if let Some(email) = email {
            any = any.add(user::Column::Email.eq(email));
        }
        if let Some(username) = username {
            any = any.add(user::Column::Username.eq(username));
        }
        if any.is_empty() {
            return Ok(None);
        }

        let mut query = UserEntity::find().filter(any);
        if let Some(id) = exclude {
            query = query.filter(user::Column::Id.ne(id));
        }

        let result = query.one(&self.db).await.map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }

    async fn list(
        &self,
        sort: UserSortField,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), RepoError> {
        let query = UserEntity::find()
            .order_by_desc(sort_column(sort))
            .order_by_asc(user::Column::Id);

        let (models, total) = fetch_page(&self.db, query, page).await?;
        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn search(&self, term: &str, page: PageRequest) -> Result<(Vec<User>, u64), RepoError> {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let lower = |column: user::Column| Expr::expr(Func::lower(Expr::col(column)));

        let query = UserEntity::find()
            .filter(
                Condition::any()
                    .add(lower(user::Column::Name).like(pattern.as_str()))
                    .add(lower(user::Column::Username).like(pattern.as_str())),
            )
            .order_by_desc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id);

        let (models, total) = fetch_page(&self.db, query, page).await?;
        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn touch_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError> {
        let updated = UserEntity::update_many()
            .col_expr(user::Column::LastLogin, Expr::value(at))
            .filter(user::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        UserEntity::find().count(&self.db).await.map_err(map_db_err)
    }
}
