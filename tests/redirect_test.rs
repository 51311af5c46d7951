use std::sync::Arc;

use tokio::sync::Mutex;
use url::Url;

use spoctl::management::{SessionTokenStore, TokenStore};
use spoctl::spotify::{RedirectHandler, scrub};
use spoctl::types::{LoginOutcome, PendingLogin};

fn setup() -> (
    Arc<SessionTokenStore>,
    Arc<Mutex<Option<PendingLogin>>>,
    RedirectHandler,
) {
    let store = Arc::new(SessionTokenStore::new());
    let pending = Arc::new(Mutex::new(None));
    let handler = RedirectHandler::new(
        Arc::clone(&store) as Arc<dyn TokenStore>,
        Arc::clone(&pending),
    );
    (store, pending, handler)
}

#[tokio::test]
async fn test_fragment_token_is_stored_and_scrubbed() {
    let (store, _pending, handler) = setup();
    let url =
        Url::parse("https://app.example/dash#access_token=ABC&expires_in=3600&token_type=Bearer")
            .unwrap();

    let consumed = handler.consume(&url).await;

    assert_eq!(
        consumed.outcome,
        LoginOutcome::Authenticated("ABC".to_string())
    );
    assert_eq!(consumed.scrubbed.as_str(), "https://app.example/dash");

    let credential = store.read().expect("token should be stored");
    assert_eq!(credential.access_token, "ABC");
    assert!(credential.expires_at.is_some());
}

#[tokio::test]
async fn test_query_token_variant_is_accepted() {
    let (store, _pending, handler) = setup();
    let url = Url::parse("https://app.example/dash?access_token=XYZ").unwrap();

    let consumed = handler.consume(&url).await;

    assert_eq!(
        consumed.outcome,
        LoginOutcome::Authenticated("XYZ".to_string())
    );
    // No lifetime given: credential is non-expiring for this session
    let credential = store.read().expect("token should be stored");
    assert_eq!(credential.expires_at, None);
}

#[tokio::test]
async fn test_unparseable_expiry_is_treated_as_absent() {
    let (store, _pending, handler) = setup();
    let url = Url::parse("https://app.example/dash#access_token=ABC&expires_in=soon").unwrap();

    let consumed = handler.consume(&url).await;

    assert_eq!(
        consumed.outcome,
        LoginOutcome::Authenticated("ABC".to_string())
    );
    assert_eq!(store.read().unwrap().expires_at, None);
}

#[tokio::test]
async fn test_provider_error_rejects_and_leaves_store_untouched() {
    let (store, _pending, handler) = setup();
    let url = Url::parse("https://app.example/dash#error=access_denied").unwrap();

    let consumed = handler.consume(&url).await;

    assert_eq!(
        consumed.outcome,
        LoginOutcome::Rejected("access_denied".to_string())
    );
    assert_eq!(consumed.scrubbed.as_str(), "https://app.example/dash");
    assert!(store.read().is_none());
}

#[tokio::test]
async fn test_code_is_paired_with_pending_verifier() {
    let (store, pending, handler) = setup();
    {
        let mut slot = pending.lock().await;
        *slot = Some(PendingLogin {
            code_verifier: "v123".to_string(),
            outcome: None,
        });
    }

    let url = Url::parse("http://127.0.0.1:8888/callback?code=AQexample").unwrap();
    let consumed = handler.consume(&url).await;

    assert_eq!(
        consumed.outcome,
        LoginOutcome::CodePending {
            code: "AQexample".to_string(),
            verifier: "v123".to_string(),
        }
    );
    assert_eq!(consumed.scrubbed.as_str(), "http://127.0.0.1:8888/callback");
    // The exchange itself is the caller's job; nothing is stored yet
    assert!(store.read().is_none());
}

#[tokio::test]
async fn test_code_without_pending_attempt_is_rejected() {
    let (store, _pending, handler) = setup();
    let url = Url::parse("http://127.0.0.1:8888/callback?code=AQexample").unwrap();

    let consumed = handler.consume(&url).await;

    assert!(matches!(consumed.outcome, LoginOutcome::Rejected(_)));
    assert!(store.read().is_none());
}

#[tokio::test]
async fn test_consume_is_idempotent_on_scrubbed_url() {
    let (store, _pending, handler) = setup();
    let url = Url::parse("https://app.example/dash#access_token=ABC&expires_in=3600").unwrap();

    let first = handler.consume(&url).await;
    assert_eq!(
        first.outcome,
        LoginOutcome::Authenticated("ABC".to_string())
    );

    // Simulate a later page load on the already-scrubbed address after the
    // credential is gone: the stale URL must not re-save anything.
    store.clear();
    let second = handler.consume(&first.scrubbed).await;
    assert_eq!(second.outcome, LoginOutcome::NoCallback);
    assert_eq!(second.scrubbed, first.scrubbed);
    assert!(store.read().is_none());

    let third = handler.consume(&second.scrubbed).await;
    assert_eq!(third.outcome, LoginOutcome::NoCallback);
}

#[tokio::test]
async fn test_error_wins_over_token_and_code() {
    let (store, _pending, handler) = setup();
    let url = Url::parse("https://app.example/dash#error=access_denied&access_token=ABC").unwrap();

    let consumed = handler.consume(&url).await;

    assert_eq!(
        consumed.outcome,
        LoginOutcome::Rejected("access_denied".to_string())
    );
    assert!(store.read().is_none());
}

#[test]
fn test_scrub_strips_query_and_fragment() {
    let url = Url::parse("https://app.example/dash?code=AQ#access_token=ABC").unwrap();
    assert_eq!(scrub(&url).as_str(), "https://app.example/dash");

    // Already-clean URLs pass through unchanged
    let clean = Url::parse("https://app.example/dash").unwrap();
    assert_eq!(scrub(&clean), clean);
}
