// Background poll worker: fetch, aggregate, diff, publish, sleep.
// Cycles never overlap; a failed fetch skips the cycle and leaves the
// previously published snapshot in place.

use crate::aggregate::{self, Metric};
use crate::config::{AgeGateConfig, GroupDef};
use crate::delta::DeltaTracker;
use crate::hub_repo::HubRepo;
use crate::mcstatus_repo::McstatusRepo;
use crate::models::DashboardSnapshot;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{RwLock, broadcast};
use tokio::time::{Duration, Instant, interval};

/// Rate limit for "no receivers" logging (avoid a line every cycle when no one is on /ws/stats)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Repos, channels, and shutdown for the worker.
pub struct WorkerDeps {
    pub hub_repo: Arc<HubRepo>,
    pub mcstatus_repo: Option<Arc<McstatusRepo>>,
    pub tx: broadcast::Sender<DashboardSnapshot>,
    /// Last-known-good snapshot served by /api/stats; worker is the only writer.
    pub latest: Arc<RwLock<Option<DashboardSnapshot>>>,
    pub ws_stats_connections: Arc<AtomicUsize>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and grouping config. The auxiliary endpoint runs on its own
/// slower cadence independent of the main poll interval.
pub struct WorkerConfig {
    pub groups: Vec<GroupDef>,
    pub age_gate: AgeGateConfig,
    pub poll_interval_ms: u64,
    pub aux_poll_interval_ms: u64,
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        hub_repo,
        mcstatus_repo,
        tx,
        latest,
        ws_stats_connections,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        groups,
        age_gate,
        poll_interval_ms,
        aux_poll_interval_ms,
        stats_log_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(poll_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut aux_tick = interval(Duration::from_millis(aux_poll_interval_ms));
        aux_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut tracker = DeltaTracker::new();
        // Last-known-good auxiliary value; a failed auxiliary poll must not
        // remove the row from subsequent snapshots.
        let mut last_aux: Option<u64> = None;
        let mut cycles_published: u64 = 0;
        let mut cycles_skipped: u64 = 0;
        let mut last_no_receivers_warn: Option<Instant> = None;

        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", poll_interval_ms);
        let _guard = worker_span.enter();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let servers = match hub_repo.fetch_servers().await {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                operation = "fetch_servers",
                                "hub fetch failed; keeping previous cycle"
                            );
                            cycles_skipped += 1;
                            continue;
                        }
                    };

                    let timestamp = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_millis() as u64)
                        .unwrap_or_else(|e| {
                            tracing::warn!(
                                error = %e,
                                operation = "get_timestamp",
                                "system time error"
                            );
                            0
                        });

                    let mut stats = aggregate::aggregate(&servers, &groups);
                    if let (Some(repo), Some(value)) = (&mcstatus_repo, last_aux) {
                        stats.push(aggregate::group_stat(&repo.name, value, 1));
                    }
                    let age = aggregate::age_segments(&servers, &age_gate);

                    let players = tracker.players.observe(aggregate::board(&stats, Metric::Players));
                    let ratios = tracker.ratios.observe(aggregate::board(&stats, Metric::Ratio));
                    let ratings = tracker.ratings.observe(aggregate::board(&stats, Metric::Rating));

                    let snapshot = DashboardSnapshot {
                        timestamp,
                        groups: stats,
                        players,
                        ratios,
                        ratings,
                        age,
                    };

                    *latest.write().await = Some(snapshot.clone());
                    cycles_published += 1;

                    if tx.send(snapshot).is_err() {
                        let should_warn = last_no_receivers_warn
                            .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                        if should_warn {
                            tracing::debug!(
                                operation = "broadcast_snapshot",
                                "No active WebSocket clients; broadcast channel has no receivers"
                            );
                            last_no_receivers_warn = Some(Instant::now());
                        }
                    }
                }
                _ = aux_tick.tick() => {
                    if let Some(repo) = &mcstatus_repo {
                        match repo.fetch_players_online().await {
                            Ok(value) => last_aux = Some(value),
                            Err(e) => {
                                tracing::warn!(
                                    error = %e,
                                    operation = "fetch_players_online",
                                    "auxiliary fetch failed; keeping last value"
                                );
                            }
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_stats_clients =
                            ws_stats_connections.load(std::sync::atomic::Ordering::Relaxed),
                        cycles_published,
                        cycles_skipped,
                        "app stats"
                    );
                }
            }
        }
    })
}
