use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use tokio::sync::Mutex;
use url::Url;

use crate::{
    config,
    management::{SessionTokenStore, TokenStore},
    server::start_callback_server,
    spotify::{self, PlayerClient, RedirectHandler},
    types::{ApiOutcome, CallbackResult, LoginOutcome, PendingLogin, PlaybackSnapshot},
    utils, warning,
};

/// The surface the interactive host talks to.
///
/// Owns the session-scoped token store, the playback client reading through
/// it, and the single pending-login slot shared with the callback server.
/// Per session the states are: logged out, authorization pending (between
/// `login()` and the provider's redirect), authenticated. A 401 from any
/// call, an explicit `logout()` or lazy expiry on read all drop back to
/// logged out.
pub struct PlayerSession {
    store: Arc<SessionTokenStore>,
    client: PlayerClient,
    pending: Arc<Mutex<Option<PendingLogin>>>,
    server_started: AtomicBool,
}

impl PlayerSession {
    pub fn new() -> Self {
        let store = Arc::new(SessionTokenStore::new());
        let client = PlayerClient::new(
            config::spotify_apiurl(),
            Arc::clone(&store) as Arc<dyn TokenStore>,
        );
        PlayerSession {
            store,
            client,
            pending: Arc::new(Mutex::new(None)),
            server_started: AtomicBool::new(false),
        }
    }

    /// Runs the full authorization flow: generates the proof-key pair,
    /// records the pending attempt, starts the local callback server, opens
    /// the authorization URL in the browser and waits for the callback to
    /// deposit a result.
    ///
    /// Only one attempt can be in flight; a second `login()` replaces the
    /// previous pending attempt. The verifier is dropped when the attempt
    /// concludes, successfully or not.
    pub async fn login(&self) -> Result<(), String> {
        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);

        // Store verifier before navigation; the code exchange needs it.
        {
            let mut slot = self.pending.lock().await;
            *slot = Some(PendingLogin {
                code_verifier,
                outcome: None,
            });
        }

        if !self.server_started.swap(true, Ordering::SeqCst) {
            let handler = self.redirect_handler();
            tokio::spawn(async move {
                start_callback_server(Arc::new(handler)).await;
            });
        }

        let auth_url = spotify::build_authorize_url(&code_challenge);
        if webbrowser::open(&auth_url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                auth_url
            );
        }

        let result = self.wait_for_callback().await;

        // The attempt is over either way; consume the verifier.
        {
            let mut slot = self.pending.lock().await;
            *slot = None;
        }

        match result {
            Some(CallbackResult::Granted) => Ok(()),
            Some(CallbackResult::Denied(reason)) => Err(reason),
            None => Err("authentication timed out".to_string()),
        }
    }

    /// Completes a login from a manually pasted redirect URL.
    ///
    /// Covers both callback shapes: a fragment-delivered token is saved
    /// directly, an authorization code is exchanged with the verifier of the
    /// pending attempt started by the last `login()`.
    pub async fn login_with_redirect(&self, raw_url: &str) -> Result<(), String> {
        let current = Url::parse(raw_url).map_err(|e| format!("not a valid URL: {}", e))?;

        let handler = self.redirect_handler();
        let consumed = handler.consume(&current).await;

        let result = match consumed.outcome {
            LoginOutcome::Authenticated(_) => Ok(()),
            LoginOutcome::CodePending { code, verifier } => {
                match spotify::exchange_code_pkce(&code, &verifier).await {
                    Ok(grant) if !grant.access_token.is_empty() => {
                        self.store.save(&grant.access_token, grant.expires_in);
                        Ok(())
                    }
                    Ok(_) => Err("token exchange rejected by provider".to_string()),
                    Err(e) => Err(format!("token exchange failed: {}", e)),
                }
            }
            LoginOutcome::Rejected(reason) => Err(reason),
            LoginOutcome::NoCallback => Err("URL carries no callback parameters".to_string()),
        };

        let mut slot = self.pending.lock().await;
        *slot = None;
        result
    }

    pub fn is_connected(&self) -> bool {
        self.store.read().is_some()
    }

    pub fn logout(&self) {
        self.store.clear();
    }

    pub async fn fetch_now_playing(&self) -> ApiOutcome<PlaybackSnapshot> {
        self.client.currently_playing().await
    }

    pub async fn next(&self) -> ApiOutcome<()> {
        self.client.next().await
    }

    pub async fn previous(&self) -> ApiOutcome<()> {
        self.client.previous().await
    }

    pub async fn play_pause(&self, is_playing: bool) -> ApiOutcome<()> {
        self.client.play_pause(is_playing).await
    }

    fn redirect_handler(&self) -> RedirectHandler {
        RedirectHandler::new(
            Arc::clone(&self.store) as Arc<dyn TokenStore>,
            Arc::clone(&self.pending),
        )
    }

    /// Polls the pending slot for a deposited result, one second at a time,
    /// for at most a minute. Runs concurrently with the callback handler.
    async fn wait_for_callback(&self) -> Option<CallbackResult> {
        let max_wait = Duration::from_secs(60);
        let start = Instant::now();

        while start.elapsed() < max_wait {
            let slot = self.pending.lock().await;
            if let Some(pending) = slot.as_ref() {
                if let Some(result) = &pending.outcome {
                    return Some(result.clone());
                }
            }
            drop(slot);
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        None
    }
}

impl Default for PlayerSession {
    fn default() -> Self {
        Self::new()
    }
}
