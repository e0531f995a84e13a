//! # tavern-auth
//!
//! The Tavern authentication session subsystem.
//!
//! ## Modules
//!
//! - `token` — opaque token generation and the signed-token codec
//! - `session` — session store, lifecycle service, and the lock gate
//! - `identity` — identity resolution from a session's user reference
//! - `password` — Argon2id password hashing

pub mod identity;
pub mod password;
pub mod session;
pub mod token;

#[cfg(test)]
pub(crate) mod testutil;

pub use identity::{IdentityResolver, PgIdentityResolver};
pub use password::PasswordHasher;
pub use session::{AuthState, PendingSession, SessionService, SessionStore};
pub use token::TokenCodec;
