use std::sync::Arc;

use axum::{Extension, extract::RawQuery, response::Html};
use url::Url;

use crate::{
    config,
    management::TokenStore,
    spotify,
    spotify::RedirectHandler,
    types::{CallbackResult, LoginOutcome},
    warning,
};

pub async fn callback(
    RawQuery(query): RawQuery,
    Extension(handler): Extension<Arc<RedirectHandler>>,
) -> Html<&'static str> {
    // Rebuild the redirect URL the provider actually hit, so the served
    // callback and a pasted URL share one parsing path.
    let raw = match query {
        Some(query) => format!("{}?{}", config::spotify_redirect_uri(), query),
        None => config::spotify_redirect_uri(),
    };
    let current = match Url::parse(&raw) {
        Ok(url) => url,
        Err(e) => {
            warning!("Malformed callback URL: {}", e);
            return Html("<h4>Malformed callback URL.</h4>");
        }
    };

    let consumed = handler.consume(&current).await;
    match consumed.outcome {
        LoginOutcome::Authenticated(_) => {
            handler.deposit(CallbackResult::Granted).await;
            Html("<h2>Authentication successful.</h2><p>You can close this browser window.</p>")
        }
        LoginOutcome::CodePending { code, verifier } => {
            match spotify::exchange_code_pkce(&code, &verifier).await {
                Ok(grant) if !grant.access_token.is_empty() => {
                    handler.store().save(&grant.access_token, grant.expires_in);
                    handler.deposit(CallbackResult::Granted).await;
                    Html(
                        "<h2>Authentication successful.</h2><p>You can close this browser window.</p>",
                    )
                }
                Ok(_) => {
                    warning!("Token exchange rejected by provider");
                    handler
                        .deposit(CallbackResult::Denied(
                            "token exchange rejected by provider".to_string(),
                        ))
                        .await;
                    Html("<h4>Login failed.</h4>")
                }
                Err(e) => {
                    warning!("Token exchange failed: {}", e);
                    handler
                        .deposit(CallbackResult::Denied(format!(
                            "token exchange failed: {}",
                            e
                        )))
                        .await;
                    Html("<h4>Login failed.</h4>")
                }
            }
        }
        LoginOutcome::Rejected(reason) => {
            handler.deposit(CallbackResult::Denied(reason)).await;
            Html("<h4>Login failed.</h4>")
        }
        LoginOutcome::NoCallback => Html("<h4>Missing authorization callback parameters.</h4>"),
    }
}
