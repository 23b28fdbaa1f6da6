use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Enable foreign keys for SQLite
        if manager.get_database_backend() == sea_orm::DatabaseBackend::Sqlite {
            manager
                .get_connection()
                .execute_unprepared("PRAGMA foreign_keys = ON")
                .await?;
        }

        // Create owners table
        manager
            .create_table(
                Table::create()
                    .table(Owners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Owners::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Owners::Name))
                    .col(
                        ColumnDef::new(Owners::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(Owners::Phone))
                    .col(big_integer(Owners::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create assets table; deleting an owner removes its assets
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Assets::Name))
                    .col(string(Assets::Category))
                    .col(string(Assets::OwnerId))
                    .col(big_integer(Assets::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assets_owner")
                            .from(Assets::Table, Assets::OwnerId)
                            .to(Owners::Table, Owners::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on assets.owner_id
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assets_owner")
                    .table(Assets::Table)
                    .col(Assets::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Owners::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Owners {
    Table,
    Id,
    Name,
    Email,
    Phone,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    Id,
    Name,
    Category,
    OwnerId,
    CreatedAt,
}
