use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// A delegated-access credential for the Spotify Web API.
///
/// `expires_at` is an absolute epoch-second instant; `None` means the
/// credential does not expire within this session. A credential whose
/// expiry has passed must never be handed out by the token store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: Option<u64>,
}

/// The access token and lifetime returned by the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: Option<u64>,
}

/// A single in-flight login attempt.
///
/// Held between `login()` and the provider's redirect back; the code
/// verifier in here is the only thing that authorizes exchanging the
/// returned authorization code for a token.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub code_verifier: String,
    pub outcome: Option<CallbackResult>,
}

/// What the callback side deposits for the waiting login flow.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackResult {
    Granted,
    Denied(String),
}

/// Result of consuming the provider's redirect back to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// A token arrived directly (implicit-style callback) and was stored.
    Authenticated(String),
    /// An authorization code arrived; the caller must complete the
    /// code-for-token exchange with the paired verifier.
    CodePending { code: String, verifier: String },
    /// The provider reported an error, or the callback cannot be honored.
    Rejected(String),
    /// The URL carried no callback parameters at all.
    NoCallback,
}

/// Result of any call against the playback API.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success(T),
    /// Playback query only: nothing is currently playing.
    NoContent,
    /// Credential missing, expired, or rejected by the provider. When a
    /// live call is rejected the stored credential has already been cleared.
    Unauthorized,
    /// Any other 4xx/5xx; the credential is left intact.
    Failure(u16),
    /// Network-level failure (DNS, timeout, connection reset).
    TransportError,
}

/// Read-only view of the current playback state, recomputed on every query.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub track_name: String,
    pub artist_names: Vec<String>,
    pub artwork_url: Option<String>,
    pub progress_ms: u64,
    pub duration_ms: u64,
    pub is_playing: bool,
}

impl PlaybackSnapshot {
    pub fn artist_line(&self) -> String {
        self.artist_names.join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentlyPlayingResponse {
    pub item: Option<TrackItem>,
    pub progress_ms: Option<u64>,
    pub is_playing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    pub name: String,
    pub artists: Vec<TrackArtist>,
    pub album: Option<AlbumInfo>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub images: Vec<ImageInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub url: String,
}

#[derive(Tabled)]
pub struct NowPlayingRow {
    pub state: String,
    pub track: String,
    pub artists: String,
    pub progress: String,
}
