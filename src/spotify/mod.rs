//! # Spotify Integration Module
//!
//! Integration layer between the player session and Spotify's services,
//! covering both halves of the credential lifecycle:
//!
//! - [`auth`] - Builds the authorization URL for the OAuth 2.0 PKCE flow and
//!   exchanges the returned code for an access token. No client secret is
//!   ever stored or transmitted; the proof-key pair makes the exchange
//!   verifiable on the provider side.
//! - [`redirect`] - Consumes the provider's redirect back to the
//!   application, regardless of whether the parameters arrive in the URL
//!   fragment (implicit grant) or the query string (authorization code),
//!   and scrubs sensitive parameters from the visible address.
//! - [`player`] - Authenticated calls against the playback endpoints with
//!   uniform status interpretation: `GET /me/player/currently-playing`,
//!   `POST /me/player/next`, `POST /me/player/previous`,
//!   `PUT /me/player/play` and `PUT /me/player/pause`.
//!
//! All HTTP communication goes through `reqwest`; responses are interpreted
//! into [`crate::types::ApiOutcome`] so callers never deal with raw status
//! codes or thrown errors.

pub mod auth;
pub mod player;
pub mod redirect;

pub use auth::{build_authorize_url, exchange_code_pkce};
pub use player::{PlayerClient, snapshot_from_payload};
pub use redirect::{RedirectHandler, RedirectOutcome, scrub};
