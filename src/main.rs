use anyhow::Result;
use hubwatch::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{RwLock, broadcast};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let (tx, _) = broadcast::channel::<models::DashboardSnapshot>(
        app_config.publishing.broadcast_capacity,
    );

    let hub_repo = Arc::new(hub_repo::HubRepo::new(
        &app_config.hub.url,
        app_config.hub.timeout_ms,
    )?);
    let mcstatus_repo = match &app_config.auxiliary {
        Some(aux) => Some(Arc::new(mcstatus_repo::McstatusRepo::new(
            &aux.name,
            &aux.url,
            aux.timeout_ms,
        )?)),
        None => None,
    };

    let latest = Arc::new(RwLock::new(None));
    let ws_stats_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            hub_repo: hub_repo.clone(),
            mcstatus_repo,
            tx: tx.clone(),
            latest: latest.clone(),
            ws_stats_connections: ws_stats_connections.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            groups: app_config.groups.clone(),
            age_gate: app_config.age_gate.clone(),
            poll_interval_ms: app_config.hub.poll_interval_ms,
            aux_poll_interval_ms: app_config
                .auxiliary
                .as_ref()
                .map(|aux| aux.poll_interval_ms)
                .unwrap_or(5000),
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
    );

    if let Some(snap) = &app_config.snapshot {
        snapshot::spawn(
            hub_repo.clone(),
            Arc::new(snapshot_repo::SnapshotRepo::new(&snap.dir)),
            snapshot::SnapshotJobConfig {
                hour: snap.hour,
                minute: snap.minute,
                groups: app_config.groups.clone(),
            },
        );
    }

    let app = routes::app(tx, latest, ws_stats_connections);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    tokio::signal::ctrl_c().await
                }
            } => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
                let _ = worker_handle.await;
            }
        }
    }

    Ok(())
}
