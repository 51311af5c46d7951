use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};

use crate::{
    management::TokenStore,
    types::{ApiOutcome, CurrentlyPlayingResponse, PlaybackSnapshot},
};

/// Authenticated client for the playback endpoints of the Spotify Web API.
///
/// Every call reads the credential through the token store first and
/// short-circuits with `Unauthorized` when none is available, so no request
/// ever leaves without a bearer token. A 401 response clears the store as a
/// side effect: the credential is presumed dead and must not be reused.
/// Each call is a single attempt; there are no hidden retries and no
/// client-side timeout.
pub struct PlayerClient {
    http: Client,
    store: Arc<dyn TokenStore>,
    api_url: String,
}

impl PlayerClient {
    pub fn new(api_url: String, store: Arc<dyn TokenStore>) -> Self {
        PlayerClient {
            http: Client::new(),
            store,
            api_url,
        }
    }

    /// Fetches the current playback state.
    ///
    /// A `204` means nothing is playing and maps to `NoContent`, as does a
    /// `200` whose body carries no track item. A well-formed `200` payload
    /// is normalized into a [`PlaybackSnapshot`].
    pub async fn currently_playing(&self) -> ApiOutcome<PlaybackSnapshot> {
        let response = match self.send(Method::GET, "/me/player/currently-playing").await {
            ApiOutcome::Success(resp) => resp,
            ApiOutcome::NoContent => return ApiOutcome::NoContent,
            ApiOutcome::Unauthorized => return ApiOutcome::Unauthorized,
            ApiOutcome::Failure(status) => return ApiOutcome::Failure(status),
            ApiOutcome::TransportError => return ApiOutcome::TransportError,
        };

        let payload = match response.json::<CurrentlyPlayingResponse>().await {
            Ok(payload) => payload,
            Err(_) => return ApiOutcome::TransportError,
        };

        match snapshot_from_payload(payload) {
            Some(snapshot) => ApiOutcome::Success(snapshot),
            None => ApiOutcome::NoContent,
        }
    }

    /// Skips forward to the next track.
    pub async fn next(&self) -> ApiOutcome<()> {
        acknowledge(self.send(Method::POST, "/me/player/next").await)
    }

    /// Skips back to the previous track.
    pub async fn previous(&self) -> ApiOutcome<()> {
        acknowledge(self.send(Method::POST, "/me/player/previous").await)
    }

    /// Pauses when `is_playing`, resumes otherwise.
    ///
    /// The flag is the caller's best-known playback state; the client does
    /// not re-query before acting.
    pub async fn play_pause(&self, is_playing: bool) -> ApiOutcome<()> {
        let path = if is_playing {
            "/me/player/pause"
        } else {
            "/me/player/play"
        };
        acknowledge(self.send(Method::PUT, path).await)
    }

    /// Shared request machinery: credential check, bearer header, status
    /// interpretation. Transport failures never touch the store.
    async fn send(&self, method: Method, path: &str) -> ApiOutcome<reqwest::Response> {
        let Some(credential) = self.store.read() else {
            return ApiOutcome::Unauthorized;
        };

        let api_url = format!("{}{}", self.api_url, path);
        let response = match self
            .http
            .request(method, &api_url)
            .bearer_auth(&credential.access_token)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(_) => return ApiOutcome::TransportError,
        };

        match response.status() {
            StatusCode::NO_CONTENT => ApiOutcome::NoContent,
            StatusCode::UNAUTHORIZED => {
                self.store.clear();
                ApiOutcome::Unauthorized
            }
            status if status.as_u16() >= 400 => ApiOutcome::Failure(status.as_u16()),
            _ => ApiOutcome::Success(response),
        }
    }
}

/// Normalizes the currently-playing payload into a snapshot. Returns `None`
/// when the payload carries no track (e.g. a podcast episode withheld from
/// the API, or playback that just stopped).
pub fn snapshot_from_payload(payload: CurrentlyPlayingResponse) -> Option<PlaybackSnapshot> {
    let item = payload.item?;
    Some(PlaybackSnapshot {
        track_name: item.name,
        artist_names: item.artists.into_iter().map(|artist| artist.name).collect(),
        artwork_url: item
            .album
            .and_then(|album| album.images.into_iter().next())
            .map(|image| image.url),
        progress_ms: payload.progress_ms.unwrap_or(0),
        duration_ms: item.duration_ms,
        is_playing: payload.is_playing,
    })
}

/// Control endpoints answer `204` on success; both that and any other
/// non-error body collapse into an empty acknowledgment.
fn acknowledge(outcome: ApiOutcome<reqwest::Response>) -> ApiOutcome<()> {
    match outcome {
        ApiOutcome::Success(_) | ApiOutcome::NoContent => ApiOutcome::Success(()),
        ApiOutcome::Unauthorized => ApiOutcome::Unauthorized,
        ApiOutcome::Failure(status) => ApiOutcome::Failure(status),
        ApiOutcome::TransportError => ApiOutcome::TransportError,
    }
}
