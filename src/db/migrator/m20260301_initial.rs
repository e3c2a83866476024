use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents before children so foreign keys resolve on every backend.
        create(manager, &schema, Users).await?;
        create(manager, &schema, Workspaces).await?;
        create(manager, &schema, Teams).await?;
        create(manager, &schema, TeamMembers).await?;
        create(manager, &schema, Invitations).await?;
        create(manager, &schema, Projects).await?;
        create(manager, &schema, Tasks).await?;
        create(manager, &schema, Subtasks).await?;
        create(manager, &schema, Tags).await?;
        create(manager, &schema, TaskTags).await?;
        create(manager, &schema, ActivityLogs).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            ActivityLogs.into_table_ref(),
            TaskTags.into_table_ref(),
            Tags.into_table_ref(),
            Subtasks.into_table_ref(),
            Tasks.into_table_ref(),
            Projects.into_table_ref(),
            Invitations.into_table_ref(),
            TeamMembers.into_table_ref(),
            Teams.into_table_ref(),
            Workspaces.into_table_ref(),
            Users.into_table_ref(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }

        Ok(())
    }
}
