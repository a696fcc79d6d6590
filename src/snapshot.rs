// Daily snapshot scheduler. Fires once at the configured hour:minute (local
// time, cron schedule), does its own independent fetch+aggregate, and shares
// nothing mutable with the poll worker. Write failures are reported, never
// fatal to the live display.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregate;
use crate::config::GroupDef;
use crate::hub_repo::HubRepo;
use crate::snapshot_repo::SnapshotRepo;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SnapshotJobConfig {
    pub hour: u8,
    pub minute: u8,
    pub groups: Vec<GroupDef>,
}

/// Spawns the daily snapshot scheduler. Returns a join handle.
pub fn spawn(
    hub_repo: Arc<HubRepo>,
    repo: Arc<SnapshotRepo>,
    config: SnapshotJobConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(hub_repo, repo, config).await;
    })
}

async fn run(hub_repo: Arc<HubRepo>, repo: Arc<SnapshotRepo>, config: SnapshotJobConfig) {
    // sec min hour day month dow; sleeping to the next occurrence means the
    // job cannot double-fire within the same minute.
    let expr = format!("0 {} {} * * *", config.minute, config.hour);
    let Ok(schedule) = cron::Schedule::from_str(&expr) else {
        warn!(cron = %expr, "invalid snapshot schedule; daily snapshot will not run");
        return;
    };
    loop {
        let now = chrono::Local::now();
        let Some(next) = schedule.after(&now).next() else {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            continue;
        };
        let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
        tokio::time::sleep(delay).await;
        if let Err(e) = record_once(&hub_repo, &repo, &config.groups).await {
            warn!(error = %e, operation = "record_daily", "daily snapshot failed");
        }
    }
}

/// Runs one snapshot pass: fetch, aggregate, append. Used by the scheduler
/// loop; callable directly for backfill or testing.
pub async fn record_once(
    hub_repo: &HubRepo,
    repo: &SnapshotRepo,
    groups: &[GroupDef],
) -> anyhow::Result<()> {
    let servers = hub_repo.fetch_servers().await?;
    let stats = aggregate::aggregate(&servers, groups);
    let path = repo.record_daily(chrono::Local::now(), &stats)?;
    info!(path = %path.display(), groups = stats.len(), "daily snapshot recorded");
    Ok(())
}
