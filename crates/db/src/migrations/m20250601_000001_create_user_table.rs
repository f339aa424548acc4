//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(User::Name).string_len(256).not_null())
                    .col(ColumnDef::new(User::Email).string_len(320).not_null())
                    .col(ColumnDef::new(User::Password).string_len(256).not_null())
                    .col(ColumnDef::new(User::AvatarUrl).string_len(1024))
                    .col(ColumnDef::new(User::CoverUrl).string_len(1024))
                    .col(ColumnDef::new(User::AboutMe).text())
                    .col(ColumnDef::new(User::City).string_len(256))
                    .col(ColumnDef::new(User::Country).string_len(256))
                    .col(ColumnDef::new(User::Company).string_len(256))
                    .col(ColumnDef::new(User::JobTitle).string_len(256))
                    .col(ColumnDef::new(User::FacebookLink).string_len(1024))
                    .col(ColumnDef::new(User::InstagramLink).string_len(1024))
                    .col(ColumnDef::new(User::LinkedinLink).string_len(1024))
                    .col(ColumnDef::new(User::TwitterLink).string_len(1024))
                    .col(ColumnDef::new(User::PostCount).integer().not_null().default(0))
                    .col(ColumnDef::new(User::FriendCount).integer().not_null().default(0))
                    .col(ColumnDef::new(User::IsDeleted).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: email
        manager
            .create_index(
                Index::create()
                    .name("idx_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: created_at (list ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_created_at")
                    .table(User::Table)
                    .col(User::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Name,
    Email,
    Password,
    AvatarUrl,
    CoverUrl,
    AboutMe,
    City,
    Country,
    Company,
    JobTitle,
    FacebookLink,
    InstagramLink,
    LinkedinLink,
    TwitterLink,
    PostCount,
    FriendCount,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}
