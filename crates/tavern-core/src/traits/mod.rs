//! Shared traits implemented across Tavern crates.

pub mod cache;
