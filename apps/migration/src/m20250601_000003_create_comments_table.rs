use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(pk_uuid(Comments::Id))
                    .col(uuid(Comments::UserId))
                    .col(uuid(Comments::PromptId))
                    .col(text(Comments::Content))
                    .col(boolean(Comments::IsEdited).default(false))
                    .col(timestamp_with_time_zone_null(Comments::EditedAt))
                    .col(
                        timestamp_with_time_zone(Comments::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Comments::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Comments outlive their prompt and author, so no foreign keys here.
        for (name, column) in [
            ("idx_comments_prompt_id", Comments::PromptId),
            ("idx_comments_user_id", Comments::UserId),
            ("idx_comments_created_at", Comments::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Comments::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Comments {
    Table,
    Id,
    UserId,
    PromptId,
    Content,
    IsEdited,
    EditedAt,
    CreatedAt,
    UpdatedAt,
}
