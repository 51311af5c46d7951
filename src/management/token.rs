use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::types::Credential;

/// Narrow storage abstraction for the current session's credential.
///
/// The store is the sole owner of credential state. Every other component
/// either reads through it or asks it to clear; nothing mutates a credential
/// in place. Implementations must keep `save`/`clear` atomic with respect to
/// `read`, since a 401 on one in-flight call may clear the credential while
/// another call is reading it.
pub trait TokenStore: Send + Sync {
    /// Stores a token. When a lifetime is given, the absolute expiry instant
    /// is computed here, once, as now + `expires_in` seconds.
    fn save(&self, access_token: &str, expires_in: Option<u64>);

    /// Returns the stored credential, applying lazy expiry: a credential
    /// whose expiry instant has passed is cleared under the same lock and
    /// never returned. There is no background timer; this check runs on
    /// every read.
    fn read(&self) -> Option<Credential>;

    /// Removes token and expiry unconditionally.
    fn clear(&self);
}

/// Process-lifetime token store.
///
/// Tokens live exactly as long as the session; nothing is written to disk,
/// so ending the process is equivalent to logging out.
#[derive(Default)]
pub struct SessionTokenStore {
    slot: Mutex<Option<Credential>>,
}

impl SessionTokenStore {
    pub fn new() -> Self {
        SessionTokenStore {
            slot: Mutex::new(None),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Credential>> {
        // A poisoned lock still holds a coherent Option; keep serving it
        // rather than taking the whole session down.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for SessionTokenStore {
    fn save(&self, access_token: &str, expires_in: Option<u64>) {
        let expires_at = expires_in.map(|secs| Utc::now().timestamp() as u64 + secs);
        *self.lock() = Some(Credential {
            access_token: access_token.to_string(),
            expires_at,
        });
    }

    fn read(&self) -> Option<Credential> {
        let mut slot = self.lock();
        if let Some(credential) = slot.as_ref() {
            if let Some(expires_at) = credential.expires_at {
                if Utc::now().timestamp() as u64 >= expires_at {
                    *slot = None;
                    return None;
                }
            }
        }
        slot.clone()
    }

    fn clear(&self) {
        *self.lock() = None;
    }
}
