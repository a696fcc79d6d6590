// HTTP + WebSocket routes

use crate::aggregate::{self, Metric, SortOrder};
use crate::models::DashboardSnapshot;
use crate::version;
use axum::{
    Json, Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{RwLock, broadcast};
use tokio::time::{Duration, timeout};
use tower_http::cors::{Any, CorsLayer};

pub fn app(
    stats_tx: broadcast::Sender<DashboardSnapshot>,
    latest: Arc<RwLock<Option<DashboardSnapshot>>>,
    ws_stats_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        stats_tx,
        latest,
        ws_stats_connections,
    };
    Router::new()
        .route("/", get(|| async { "hubwatch: ok" })) // GET /
        .route("/version", get(version_handler)) // GET /version
        .route("/api/stats", get(api_stats)) // GET /api/stats
        .route("/api/groups", get(api_groups)) // GET /api/groups?sort=&order=
        .route("/ws/stats", get(ws_stats)) // WS /ws/stats
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

#[derive(Clone)]
struct AppState {
    stats_tx: broadcast::Sender<DashboardSnapshot>,
    latest: Arc<RwLock<Option<DashboardSnapshot>>>,
    ws_stats_connections: Arc<AtomicUsize>,
}

/// Ping interval for WebSocket connection health.
const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
/// Max time to wait for a send before treating the client as too slow / dead.
const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

async fn version_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": version::NAME,
        "version": version::VERSION,
    }))
}

/// Latest published snapshot; 503 until the first successful cycle.
async fn api_stats(State(state): State<AppState>) -> Response {
    match state.latest.read().await.clone() {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "no data yet").into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct GroupsQuery {
    sort: Option<String>,
    order: Option<String>,
}

/// Presentation-time sorts over the same group stats the snapshot carries.
async fn api_groups(State(state): State<AppState>, Query(q): Query<GroupsQuery>) -> Response {
    let metric = match q.sort.as_deref().unwrap_or("players") {
        "players" => Metric::Players,
        "ratio" => Metric::Ratio,
        "rating" => Metric::Rating,
        other => {
            return (StatusCode::BAD_REQUEST, format!("unknown sort '{other}'")).into_response();
        }
    };
    let order = match q.order.as_deref().unwrap_or("desc") {
        "asc" => SortOrder::Ascending,
        "desc" => SortOrder::Descending,
        other => {
            return (StatusCode::BAD_REQUEST, format!("unknown order '{other}'")).into_response();
        }
    };
    let guard = state.latest.read().await;
    let Some(snapshot) = guard.as_ref() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "no data yet").into_response();
    };
    Json(aggregate::sorted_by(&snapshot.groups, metric, order)).into_response()
}

/// Decrements ws_stats connection count on drop (connect = +1, drop = -1).
struct WsStatsGuard(Arc<AtomicUsize>);

impl Drop for WsStatsGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
    }
}

async fn ws_stats(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let tx = state.stats_tx.clone();
    let conn_count = state.ws_stats_connections.clone();
    ws.on_upgrade(move |socket| async move {
        let mut rx = tx.subscribe();
        if let Err(e) = stream_stats(socket, &mut rx, conn_count).await {
            tracing::info!("Stats stream error: {}", e);
        }
    })
}

async fn stream_stats(
    mut socket: WebSocket,
    rx: &mut broadcast::Receiver<DashboardSnapshot>,
    conn_count: Arc<AtomicUsize>,
) -> anyhow::Result<()> {
    conn_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let _guard = WsStatsGuard(conn_count);
    tracing::info!("Client connected to stats stream");

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                let snapshot = match result {
                    Ok(s) => s,
                    Err(_) => break,
                };
                let json = serde_json::to_string(&snapshot)?;
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
