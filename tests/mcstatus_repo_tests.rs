// Auxiliary status fetch: payload parsing, failure taxonomy

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use hubwatch::hub_repo::FetchError;
use hubwatch::mcstatus_repo::McstatusRepo;

async fn serve_fixture(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/status")
}

#[tokio::test]
async fn fetch_players_online_parses_count() {
    let payload = serde_json::json!({
        "online": true,
        "players_online": 123,
        "players_max": 200
    });
    let app = Router::new().route("/status", get(move || async move { Json(payload) }));
    let url = serve_fixture(app).await;

    let repo = McstatusRepo::new("Раша", &url, 2000).unwrap();
    assert_eq!(repo.fetch_players_online().await.unwrap(), 123);
}

#[tokio::test]
async fn fetch_players_online_reports_non_200_as_status_error() {
    let app = Router::new().route(
        "/status",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response() }),
    );
    let url = serve_fixture(app).await;

    let repo = McstatusRepo::new("Раша", &url, 2000).unwrap();
    match repo.fetch_players_online().await {
        Err(FetchError::Status(status)) => assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_players_online_reports_malformed_payload_as_decode_error() {
    let app = Router::new().route("/status", get(|| async { "not json at all" }));
    let url = serve_fixture(app).await;

    let repo = McstatusRepo::new("Раша", &url, 2000).unwrap();
    assert!(matches!(
        repo.fetch_players_online().await,
        Err(FetchError::Decode(_))
    ));
}
