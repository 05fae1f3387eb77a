use std::time::Duration;

use era_player::model::{CatalogClient, CatalogError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> CatalogClient {
    CatalogClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn loads_tracks_grouped_by_section_order() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/tracks",
        json!([
            { "id": "b1", "name": "Late Night", "era": "Second", "track_length": "3:10" },
            { "id": "a1", "name": "Opening (feat. Guest)", "era": "First" },
            { "id": "x1", "name": "Loose", "era": "" },
        ]),
    )
    .await;
    mount_json(&server, "/api/sections", json!([{ "era": "First" }, { "era": "Second" }])).await;

    let catalog = client(&server).load_catalog().await.unwrap();

    let eras: Vec<&str> = catalog.sections().iter().map(|s| s.era.as_str()).collect();
    assert_eq!(eras, vec!["First", "Second", "Unknown Era"]);
    let ids: Vec<&str> = catalog.tracks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "b1", "x1"]);
    assert_eq!(catalog.get("b1").and_then(|t| t.length_secs()), Some(190.0));
}

#[tokio::test]
async fn either_endpoint_failing_fails_the_load() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/tracks", json!([])).await;
    Mock::given(method("GET"))
        .and(path("/api/sections"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).load_catalog().await.unwrap_err();
    match err {
        CatalogError::ServerError { endpoint, status } => {
            assert_eq!(endpoint, "/api/sections");
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    mount_json(&server, "/api/sections", json!([])).await;

    let err = client(&server).load_catalog().await.unwrap_err();
    assert!(matches!(err, CatalogError::Parse { .. }), "got {err}");
}

#[tokio::test]
async fn base_path_prefix_is_kept() {
    let server = MockServer::start().await;
    mount_json(&server, "/player/api/tracks", json!([{ "id": "a1", "name": "One", "era": "First" }])).await;
    mount_json(&server, "/player/api/sections", json!([{ "era": "First" }])).await;

    let client = CatalogClient::new(&format!("{}/player/", server.uri()), Duration::from_secs(5)).unwrap();
    let catalog = client.load_catalog().await.unwrap();
    assert_eq!(catalog.len(), 1);
}

#[tokio::test]
async fn artwork_absence_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/artwork/a1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/artwork/b1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.fetch_artwork("a1").await.unwrap(), None);
    assert_eq!(client.fetch_artwork("b1").await.unwrap(), Some(vec![0xFF, 0xD8, 0xFF]));
    // Unmatched routes answer 404
    assert_eq!(client.fetch_artwork("zz").await.unwrap(), None);
}

#[tokio::test]
async fn audio_is_fetched_as_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/play/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.fetch_audio("a1").await.unwrap(), b"ID3audio".to_vec());
    assert!(matches!(
        client.fetch_audio("missing").await,
        Err(CatalogError::ServerError { status: 404, .. })
    ));
}

#[tokio::test]
async fn status_reports_track_count_and_last_refresh() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/status",
        json!({ "track_count": 42, "last_refresh": "2026-01-02T03:04:05Z", "refresh_interval_minutes": 60 }),
    )
    .await;

    let status = client(&server).fetch_status().await.unwrap();
    assert_eq!(status.track_count, 42);
    assert_eq!(status.refresh_interval_minutes, Some(60));
    assert!(status.last_refresh_at().is_some());
}
