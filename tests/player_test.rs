use std::sync::{Arc, Mutex};

use axum::{
    Extension, Router,
    body::Body,
    http::{Request, Response, StatusCode},
};

use spoctl::management::{SessionTokenStore, TokenStore};
use spoctl::spotify::{PlayerClient, snapshot_from_payload};
use spoctl::types::{ApiOutcome, CurrentlyPlayingResponse};

const NOW_PLAYING_BODY: &str = r#"{
    "is_playing": true,
    "progress_ms": 42000,
    "item": {
        "name": "Harvest Moon",
        "duration_ms": 305000,
        "artists": [{"name": "Neil Young"}, {"name": "Crazy Horse"}],
        "album": {"images": [{"url": "https://i.scdn.co/image/large"}, {"url": "https://i.scdn.co/image/small"}]}
    }
}"#;

const NOTHING_PLAYING_BODY: &str = r#"{"is_playing": false, "progress_ms": null, "item": null}"#;

#[derive(Clone)]
struct Fixture {
    status: u16,
    body: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

async fn fixture_handler(
    Extension(fixture): Extension<Fixture>,
    req: Request<Body>,
) -> Response<Body> {
    fixture
        .log
        .lock()
        .unwrap()
        .push(format!("{} {}", req.method(), req.uri().path()));

    Response::builder()
        .status(StatusCode::from_u16(fixture.status).unwrap())
        .header("content-type", "application/json")
        .body(Body::from(fixture.body))
        .unwrap()
}

/// Serves every request with a fixed status/body on an ephemeral port and
/// records "METHOD /path" for each request received.
async fn spawn_fixture(status: u16, body: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let fixture = Fixture {
        status,
        body,
        log: Arc::clone(&log),
    };
    let app = Router::new()
        .fallback(fixture_handler)
        .layer(Extension(fixture));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), log)
}

fn client_with_token(base_url: &str) -> (Arc<SessionTokenStore>, PlayerClient) {
    let store = Arc::new(SessionTokenStore::new());
    store.save("test_token", None);
    let client = PlayerClient::new(
        base_url.to_string(),
        Arc::clone(&store) as Arc<dyn TokenStore>,
    );
    (store, client)
}

#[tokio::test]
async fn test_currently_playing_normalizes_payload() {
    let (base_url, log) = spawn_fixture(200, NOW_PLAYING_BODY).await;
    let (_store, client) = client_with_token(&base_url);

    let outcome = client.currently_playing().await;
    let snapshot = match outcome {
        ApiOutcome::Success(snapshot) => snapshot,
        other => panic!("expected Success, got {:?}", other),
    };

    assert_eq!(snapshot.track_name, "Harvest Moon");
    assert_eq!(snapshot.artist_names, vec!["Neil Young", "Crazy Horse"]);
    assert_eq!(snapshot.artist_line(), "Neil Young, Crazy Horse");
    assert_eq!(
        snapshot.artwork_url.as_deref(),
        Some("https://i.scdn.co/image/large")
    );
    assert_eq!(snapshot.progress_ms, 42000);
    assert_eq!(snapshot.duration_ms, 305000);
    assert!(snapshot.is_playing);

    let log = log.lock().unwrap();
    assert_eq!(log.as_slice(), ["GET /me/player/currently-playing"]);
}

#[tokio::test]
async fn test_no_content_means_nothing_playing() {
    let (base_url, _log) = spawn_fixture(204, "").await;
    let (_store, client) = client_with_token(&base_url);

    assert_eq!(client.currently_playing().await, ApiOutcome::NoContent);
}

#[tokio::test]
async fn test_ok_without_track_item_means_nothing_playing() {
    let (base_url, _log) = spawn_fixture(200, NOTHING_PLAYING_BODY).await;
    let (_store, client) = client_with_token(&base_url);

    assert_eq!(client.currently_playing().await, ApiOutcome::NoContent);
}

#[tokio::test]
async fn test_unauthorized_clears_credential() {
    let (base_url, _log) = spawn_fixture(401, r#"{"error":{"status":401}}"#).await;
    let (store, client) = client_with_token(&base_url);

    assert_eq!(client.currently_playing().await, ApiOutcome::Unauthorized);

    // The credential is presumed dead: any later is_connected() is false
    assert!(store.read().is_none());
}

#[tokio::test]
async fn test_server_failure_leaves_credential_intact() {
    let (base_url, _log) = spawn_fixture(500, r#"{"error":{"status":500}}"#).await;
    let (store, client) = client_with_token(&base_url);

    assert_eq!(client.currently_playing().await, ApiOutcome::Failure(500));
    assert!(store.read().is_some());

    let outcome = client.next().await;
    assert_eq!(outcome, ApiOutcome::Failure(500));
    assert!(store.read().is_some());
}

#[tokio::test]
async fn test_missing_credential_short_circuits_without_network() {
    let (base_url, log) = spawn_fixture(200, NOW_PLAYING_BODY).await;
    let store = Arc::new(SessionTokenStore::new());
    let client = PlayerClient::new(base_url, Arc::clone(&store) as Arc<dyn TokenStore>);

    assert_eq!(client.currently_playing().await, ApiOutcome::Unauthorized);
    assert_eq!(client.next().await, ApiOutcome::Unauthorized);
    assert_eq!(client.play_pause(true).await, ApiOutcome::Unauthorized);

    // No request ever left the client
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_control_operations_route_correctly() {
    let (base_url, log) = spawn_fixture(204, "").await;
    let (_store, client) = client_with_token(&base_url);

    assert_eq!(client.next().await, ApiOutcome::Success(()));
    assert_eq!(client.previous().await, ApiOutcome::Success(()));
    assert_eq!(client.play_pause(true).await, ApiOutcome::Success(()));
    assert_eq!(client.play_pause(false).await, ApiOutcome::Success(()));

    let log = log.lock().unwrap();
    assert_eq!(
        log.as_slice(),
        [
            "POST /me/player/next",
            "POST /me/player/previous",
            "PUT /me/player/pause",
            "PUT /me/player/play",
        ]
    );
}

#[tokio::test]
async fn test_transport_error_leaves_credential_intact() {
    // Bind and immediately drop a listener so the port refuses connections
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (store, client) = client_with_token(&format!("http://{}", addr));

    assert_eq!(client.currently_playing().await, ApiOutcome::TransportError);
    assert_eq!(client.next().await, ApiOutcome::TransportError);
    assert!(store.read().is_some());
}

#[test]
fn test_snapshot_defaults_missing_progress_and_artwork() {
    let payload: CurrentlyPlayingResponse = serde_json::from_str(
        r#"{
            "is_playing": false,
            "item": {
                "name": "Interlude",
                "duration_ms": 1000,
                "artists": []
            }
        }"#,
    )
    .unwrap();

    let snapshot = snapshot_from_payload(payload).expect("item present");
    assert_eq!(snapshot.track_name, "Interlude");
    assert!(snapshot.artist_names.is_empty());
    assert_eq!(snapshot.artwork_url, None);
    assert_eq!(snapshot.progress_ms, 0);
    assert!(!snapshot.is_playing);
}
