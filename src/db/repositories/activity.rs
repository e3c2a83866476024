use crate::entities::{activity_logs, prelude::*};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        event_type: &str,
        actor_id: Option<i32>,
        workspace_id: Option<i32>,
        message: &str,
        details: Option<String>,
    ) -> Result<()> {
        let active_model = activity_logs::ActiveModel {
            event_type: Set(event_type.to_string()),
            actor_id: Set(actor_id),
            workspace_id: Set(workspace_id),
            message: Set(message.to_string()),
            details: Set(details),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        ActivityLogs::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    /// One page (1-based) of a workspace's activity, newest first, plus the
    /// total number of pages.
    pub async fn list_for_workspace(
        &self,
        workspace_id: i32,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<activity_logs::Model>, u64)> {
        let query = ActivityLogs::find()
            .filter(activity_logs::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(activity_logs::Column::CreatedAt)
            .order_by_desc(activity_logs::Column::Id);

        let paginator = query.paginate(&self.conn, page_size);
        let total_pages = paginator.num_pages().await?;
        if page == 0 || page > total_pages {
            return Ok((Vec::new(), total_pages));
        }
        let items = paginator.fetch_page(page - 1).await?;

        Ok((items, total_pages))
    }

    pub async fn count_by_type(&self, event_type: &str) -> Result<u64> {
        let count = ActivityLogs::find()
            .filter(activity_logs::Column::EventType.eq(event_type))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = ActivityLogs::delete_many()
            .filter(activity_logs::Column::CreatedAt.lt(cutoff))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
