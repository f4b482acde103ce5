//! Create meeting table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Meeting::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Meeting::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Meeting::GroupId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Meeting::OrganizerId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Meeting::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Meeting::RoomId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Meeting::ScheduledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Meeting::DurationMinutes).integer())
                    .col(
                        ColumnDef::new(Meeting::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meeting_group")
                            .from(Meeting::Table, Meeting::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meeting_organizer")
                            .from(Meeting::Table, Meeting::OrganizerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: group_id (for per-group listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_meeting_group_id")
                    .table(Meeting::Table)
                    .col(Meeting::GroupId)
                    .to_owned(),
            )
            .await?;

        // Index: scheduled_at (for upcoming-meeting queries)
        manager
            .create_index(
                Index::create()
                    .name("idx_meeting_scheduled_at")
                    .table(Meeting::Table)
                    .col(Meeting::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Meeting::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Meeting {
    Table,
    Id,
    GroupId,
    OrganizerId,
    Title,
    RoomId,
    ScheduledAt,
    DurationMinutes,
    CreatedAt,
}

#[derive(Iden)]
enum Group {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
