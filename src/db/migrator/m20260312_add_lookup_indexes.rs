use crate::entities::{activity_logs, invitations, projects, tasks, teams};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Signup and login look invitations up by email
        manager
            .create_index(
                Index::create()
                    .name("idx_invitations_email")
                    .table(invitations::Entity)
                    .col(invitations::Column::Email)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teams_workspace_id")
                    .table(teams::Entity)
                    .col(teams::Column::WorkspaceId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_workspace_id")
                    .table(projects::Entity)
                    .col(projects::Column::WorkspaceId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_project_id")
                    .table(tasks::Entity)
                    .col(tasks::Column::ProjectId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_logs_workspace_created")
                    .table(activity_logs::Entity)
                    .col(activity_logs::Column::WorkspaceId)
                    .col(activity_logs::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_activity_logs_workspace_created",
            "idx_tasks_project_id",
            "idx_projects_workspace_id",
            "idx_teams_workspace_id",
            "idx_invitations_email",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}
