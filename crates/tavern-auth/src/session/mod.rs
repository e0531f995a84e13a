//! Session lifecycle: store wrapper, service, and lock gate.

pub mod gate;
pub mod service;
pub mod store;

pub use service::{AuthState, PendingSession, SessionService};
pub use store::SessionStore;
