//! # tavern-api
//!
//! HTTP API layer for Tavern using Axum. Hosts the session middleware
//! (credential extraction, renewal, deferred persistence), the route
//! guards, the auth handlers, and the error-to-status translation.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
