use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::{InvitationConfig, MaintenanceConfig};
use crate::db::Store;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub invitations_pruned: u64,
    pub activity_pruned: u64,
}

/// Periodic cleanup of stale invitations and old activity rows.
pub struct Scheduler {
    store: Store,
    config: MaintenanceConfig,
    invitations: InvitationConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(store: Store, config: MaintenanceConfig, invitations: InvitationConfig) -> Self {
        Self {
            store,
            config,
            invitations,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Maintenance scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting maintenance scheduler");

        let mut sched = JobScheduler::new().await?;

        let store = self.store.clone();
        let config = self.config.clone();
        let invitations = self.invitations.clone();
        let running = Arc::clone(&self.running);

        let job = Job::new_async(self.config.cron_expression.as_str(), move |_uuid, _lock| {
            let store = store.clone();
            let config = config.clone();
            let invitations = invitations.clone();
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                let start = std::time::Instant::now();
                info!(event = "job_started", job_name = "maintenance", "Starting scheduled maintenance");

                match prune(&store, &config, &invitations).await {
                    Ok(report) => info!(
                        event = "job_finished",
                        job_name = "maintenance",
                        invitations_pruned = report.invitations_pruned,
                        activity_pruned = report.activity_pruned,
                        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "Scheduled maintenance finished"
                    ),
                    Err(e) => {
                        error!(event = "job_failed", job_name = "maintenance", error = %e, "Scheduled maintenance failed");
                    }
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Maintenance scheduled with cron: {}", self.config.cron_expression);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping maintenance scheduler...");
        *self.running.write().await = false;
    }

    pub async fn run_once(&self) -> Result<MaintenanceReport> {
        prune(&self.store, &self.config, &self.invitations).await
    }
}

/// Deletes pending invitations that expired more than
/// `prune_after_days` ago and activity older than the retention window.
pub async fn prune(
    store: &Store,
    config: &MaintenanceConfig,
    invitations: &InvitationConfig,
) -> Result<MaintenanceReport> {
    let now = Utc::now();

    let invitation_cutoff = now - Duration::days(i64::from(invitations.prune_after_days));
    let invitations_pruned = store
        .invitations()
        .prune_expired(invitation_cutoff)
        .await?;

    let activity_cutoff = now - Duration::days(i64::from(config.activity_retention_days));
    let activity_pruned = store.activity().prune_before(activity_cutoff).await?;

    Ok(MaintenanceReport {
        invitations_pruned,
        activity_pruned,
    })
}
