//! Prompts table, category schema (v2): `category`, `result_type` and
//! `works_best_with` replace the older single `type` column.

use sea_orm_migration::{prelude::*, schema::*};

const CREATE_SEARCH_DOCUMENT: &str = r#"
CREATE OR REPLACE FUNCTION prompt_search_document(title text, description text, tags text[])
RETURNS tsvector
LANGUAGE sql
IMMUTABLE
AS $$
    SELECT setweight(to_tsvector('english', coalesce(title, '')), 'A')
        || setweight(to_tsvector('english', coalesce(description, '')), 'B')
        || setweight(to_tsvector('english', coalesce(array_to_string(tags, ' '), '')), 'C')
$$;
"#;

const CREATE_SEARCH_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_prompts_search \
     ON prompts USING GIN (prompt_search_document(title, description, tags))";

const CREATE_TAGS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_prompts_tags ON prompts USING GIN (tags)";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Prompts::Table)
                    .if_not_exists()
                    .col(pk_uuid(Prompts::Id))
                    .col(string_len(Prompts::Title, 200))
                    .col(string_len(Prompts::Description, 1000))
                    .col(text(Prompts::Content))
                    .col(string(Prompts::Category))
                    .col(array(Prompts::Tags, ColumnType::Text).default(Expr::cust("'{}'")))
                    .col(string_null(Prompts::CoverImage))
                    .col(string_len(Prompts::ResultType, 16).default("text"))
                    .col(text_null(Prompts::SampleOutput))
                    .col(
                        array(Prompts::WorksBestWith, ColumnType::Text)
                            .default(Expr::cust("'{}'")),
                    )
                    .col(integer(Prompts::Version).default(1))
                    .col(boolean(Prompts::IsActive).default(true))
                    .col(string_len(Prompts::CreatedBy, 100).default("system"))
                    .col(string_len_null(Prompts::UpdatedBy, 100))
                    .col(big_integer(Prompts::Views).default(0))
                    .col(big_integer(Prompts::Likes).default(0))
                    .col(big_integer(Prompts::Uses).default(0))
                    .col(
                        timestamp_with_time_zone(Prompts::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Prompts::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Prompts::Version).gte(1))
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_prompts_category", Prompts::Category),
            ("idx_prompts_is_active", Prompts::IsActive),
            ("idx_prompts_created_at", Prompts::CreatedAt),
            ("idx_prompts_likes", Prompts::Likes),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Prompts::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        let db = manager.get_connection();
        db.execute_unprepared(CREATE_TAGS_INDEX).await?;
        db.execute_unprepared(CREATE_SEARCH_DOCUMENT).await?;
        db.execute_unprepared(CREATE_SEARCH_INDEX).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Prompts::Table).to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP FUNCTION IF EXISTS prompt_search_document(text, text, text[])")
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Prompts {
    Table,
    Id,
    Title,
    Description,
    Content,
    Category,
    Tags,
    CoverImage,
    ResultType,
    SampleOutput,
    WorksBestWith,
    Version,
    IsActive,
    CreatedBy,
    UpdatedBy,
    Views,
    Likes,
    Uses,
    CreatedAt,
    UpdatedAt,
}
