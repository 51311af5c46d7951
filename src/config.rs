//! Configuration management for the playback control CLI.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. Process environment variables take
//! priority; a `.env` file in the local data directory fills in what is
//! unset, and the public Spotify endpoints serve as defaults where that is
//! sensible. Only the client ID has no default, since it is issued per
//! application by the provider.

use dotenv;
use std::{env, path::PathBuf};

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from `spoctl/.env` in the platform-specific local
/// data directory:
/// - Linux: `~/.local/share/spoctl/.env`
/// - macOS: `~/Library/Application Support/spoctl/.env`
/// - Windows: `%LOCALAPPDATA%/spoctl/.env`
///
/// A missing `.env` file is not an error: all configuration can come from
/// the process environment instead.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spoctl/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    // Process environment wins; the file only fills in unset variables.
    let _ = dotenv::from_path(path);
    Ok(())
}

/// Returns the bind address for the local OAuth callback server.
///
/// Reads `SERVER_ADDRESS`, defaulting to `127.0.0.1:8888`. The port must
/// match the redirect URI registered with Spotify.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8888".to_string())
}

/// Returns the Spotify API client ID for authentication.
///
/// Retrieves the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable which
/// contains the client ID obtained when registering the application with
/// Spotify's developer platform.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the OAuth redirect URI.
///
/// Reads `SPOTIFY_API_REDIRECT_URI`, defaulting to
/// `http://127.0.0.1:8888/callback`. This must exactly match the redirect
/// URI registered in the Spotify application settings; the provider rejects
/// the authorization request otherwise.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI")
        .unwrap_or_else(|_| "http://127.0.0.1:8888/callback".to_string())
}

/// Returns the space-delimited permission scopes requested during login.
///
/// Reads `SPOTIFY_API_AUTH_SCOPE`. The default covers exactly what the
/// player session needs: reading the current track and playback state, and
/// issuing transport commands.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| {
        "user-read-currently-playing user-read-playback-state user-modify-playback-state"
            .to_string()
    })
}

/// Returns the Spotify OAuth authorization URL.
///
/// Reads `SPOTIFY_API_AUTH_URL`, defaulting to the public accounts endpoint.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

/// Returns the Spotify Web API base URL.
///
/// Reads `SPOTIFY_API_URL`, defaulting to the public v1 endpoint. Overridable
/// so the client can be pointed at a local fixture server.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Returns the Spotify OAuth token exchange URL.
///
/// Reads `SPOTIFY_API_TOKEN_URL`, defaulting to the public token endpoint.
/// Used in the final step of the PKCE flow to exchange the authorization
/// code for an access token.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}
