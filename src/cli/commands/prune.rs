//! One-off maintenance run

use crate::config::Config;
use crate::db::Store;
use crate::services::Scheduler;

pub async fn cmd_prune(config: &Config) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let scheduler = Scheduler::new(
        store,
        config.maintenance.clone(),
        config.invitations.clone(),
    );
    let report = scheduler.run_once().await?;

    println!(
        "Pruned {} expired invitation(s) and {} activity entr{}",
        report.invitations_pruned,
        report.activity_pruned,
        if report.activity_pruned == 1 { "y" } else { "ies" }
    );
    Ok(())
}
