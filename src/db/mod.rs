use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::activity::ActivityRepository;
pub use repositories::invitation::InvitationRepository;
pub use repositories::project::ProjectRepository;
pub use repositories::task::TaskRepository;
pub use repositories::team::TeamRepository;
pub use repositories::user::{User, UserRepository};
pub use repositories::workspace::WorkspaceRepository;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to an in-memory database would see its own
        // empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn workspaces(&self) -> WorkspaceRepository {
        WorkspaceRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn teams(&self) -> TeamRepository {
        TeamRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn invitations(&self) -> InvitationRepository {
        InvitationRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn projects(&self) -> ProjectRepository {
        ProjectRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn tasks(&self) -> TaskRepository {
        TaskRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn activity(&self) -> ActivityRepository {
        ActivityRepository::new(self.conn.clone())
    }
}
