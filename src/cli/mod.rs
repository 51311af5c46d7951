//! # CLI Module
//!
//! User-facing command implementations. The interactive player session in
//! [`player`] is the "UI collaborator" of the core: it calls `login()`,
//! fetches the current track on demand and issues transport commands, but
//! makes no credential decisions of its own - every outcome it prints comes
//! straight from the session facade.

mod player;

pub use player::run;
