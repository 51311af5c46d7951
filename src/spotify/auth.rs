use reqwest::Client;
use serde_json::Value;

use crate::{config, types::TokenGrant};

/// Builds the redirect URL to Spotify's authorization endpoint.
///
/// The URL carries the client ID, the registered redirect URI, the
/// space-joined permission scopes, the authorization-code response type and
/// the S256 proof-key challenge. The verifier matching `code_challenge` must
/// already be recorded in the pending login slot before navigating here,
/// since the later code exchange is impossible without it.
///
/// Deterministic given its inputs; configuration supplies everything except
/// the challenge.
pub fn build_authorize_url(code_challenge: &str) -> String {
    format!(
        "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}",
        auth_url = &config::spotify_apiauth_url(),
        client_id = &config::spotify_client_id(),
        redirect_uri = urlencode(&config::spotify_redirect_uri()),
        code_challenge = code_challenge,
        scope = urlencode(&config::spotify_scope())
    )
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// Completes the OAuth 2.0 PKCE flow by posting the code together with the
/// verifier that was generated when the flow started. The verifier proves
/// the exchange request comes from the same client that initiated login;
/// no client secret is involved.
///
/// The authorization code is single-use and short-lived, so this should run
/// immediately after the callback delivers it.
///
/// # Errors
///
/// Returns `reqwest::Error` on network failures or an unreadable response
/// body. An exchange rejected by the provider yields a grant with an empty
/// access token, which the caller treats as a failed login.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<TokenGrant, reqwest::Error> {
    let client_id = config::spotify_client_id();
    let redirect_uri = config::spotify_redirect_uri();

    let client = Client::new();
    let res = client
        .post(&config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await?;

    let json: Value = res.json().await?;

    Ok(TokenGrant {
        access_token: json["access_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        expires_in: json["expires_in"].as_u64(),
    })
}

fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
