use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string_len(Users::Name, 50))
                    .col(string_len_uniq(Users::Username, 30))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::PasswordHash))
                    .col(text(Users::Avatar))
                    .col(string_len(Users::Bio, 300))
                    .col(
                        timestamp_with_time_zone(Users::LastLogin)
                            .default(Expr::current_timestamp()),
                    )
                    .col(string_len(Users::LoginMode, 16).default("email"))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_created_at")
                    .table(Users::Table)
                    .col(Users::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Name,
    Username,
    Email,
    PasswordHash,
    Avatar,
    Bio,
    LastLogin,
    LoginMode,
    CreatedAt,
    UpdatedAt,
}
