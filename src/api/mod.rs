//! # API Module
//!
//! HTTP endpoints for the local callback server that runs during the OAuth
//! authorization flow.
//!
//! - [`callback`] - Receives Spotify's redirect after the user grants or
//!   denies consent, consumes the callback parameters, completes the
//!   code-for-token exchange and deposits the result for the waiting login
//!   flow.
//! - [`health`] - Returns application status and version for quick
//!   liveness checks.
//!
//! Both endpoints are plain async functions wired into an axum `Router` by
//! [`crate::server::start_callback_server`]. The server only needs to exist
//! while a login is in flight; it serves small static HTML pages telling
//! the user to return to the terminal.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
