use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use url::Url;

use crate::{
    management::TokenStore,
    types::{CallbackResult, LoginOutcome, PendingLogin},
};

/// What consuming a redirect produced, plus the address the host should now
/// display. The scrubbed URL has fragment and query removed; showing it with
/// replace semantics (never push) keeps token material out of history and
/// makes a second consume of the same address a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectOutcome {
    pub outcome: LoginOutcome,
    pub scrubbed: Url,
}

/// Parses the provider's redirect back to the application.
///
/// The token payload location depends on which authorization variant was
/// requested: the implicit grant returns parameters in the URL fragment, the
/// authorization-code variant in the query string. Both shapes are handled
/// here so a pasted redirect URL and a served callback go through the same
/// logic.
pub struct RedirectHandler {
    store: Arc<dyn TokenStore>,
    pending: Arc<Mutex<Option<PendingLogin>>>,
}

impl RedirectHandler {
    pub fn new(store: Arc<dyn TokenStore>, pending: Arc<Mutex<Option<PendingLogin>>>) -> Self {
        RedirectHandler { store, pending }
    }

    /// Consumes a redirect URL.
    ///
    /// Priority order: an `error` parameter wins, then a directly delivered
    /// `access_token` (saved to the store with its optional `expires_in`
    /// lifetime), then an authorization `code` (paired with the pending
    /// verifier for the caller to exchange). A URL with none of these is
    /// `NoCallback` - in particular, an already-scrubbed URL, which makes
    /// this idempotent.
    pub async fn consume(&self, current: &Url) -> RedirectOutcome {
        let params = callback_params(current);
        let scrubbed = scrub(current);

        if let Some(reason) = params.get("error") {
            return RedirectOutcome {
                outcome: LoginOutcome::Rejected(reason.clone()),
                scrubbed,
            };
        }

        if let Some(token) = params.get("access_token") {
            let expires_in = params.get("expires_in").and_then(|v| v.parse::<u64>().ok());
            self.store.save(token, expires_in);
            return RedirectOutcome {
                outcome: LoginOutcome::Authenticated(token.clone()),
                scrubbed,
            };
        }

        if let Some(code) = params.get("code") {
            let slot = self.pending.lock().await;
            let Some(pending) = slot.as_ref() else {
                // Without the matching verifier the code cannot be exchanged.
                return RedirectOutcome {
                    outcome: LoginOutcome::Rejected(
                        "authorization code received without a pending login attempt".to_string(),
                    ),
                    scrubbed,
                };
            };
            return RedirectOutcome {
                outcome: LoginOutcome::CodePending {
                    code: code.clone(),
                    verifier: pending.code_verifier.clone(),
                },
                scrubbed,
            };
        }

        RedirectOutcome {
            outcome: LoginOutcome::NoCallback,
            scrubbed,
        }
    }

    /// Records the final result of a login attempt for the waiting flow.
    /// No-op when no attempt is pending (e.g. a stray callback request).
    pub async fn deposit(&self, result: CallbackResult) {
        let mut slot = self.pending.lock().await;
        if let Some(pending) = slot.as_mut() {
            pending.outcome = Some(result);
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }
}

fn callback_params(url: &Url) -> HashMap<String, String> {
    match url.fragment() {
        Some(fragment) if !fragment.is_empty() => {
            url::form_urlencoded::parse(fragment.as_bytes())
                .into_owned()
                .collect()
        }
        _ => url.query_pairs().into_owned().collect(),
    }
}

/// Returns the URL with query and fragment removed.
pub fn scrub(url: &Url) -> Url {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    clean
}
