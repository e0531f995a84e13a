//! Opaque session tokens and their signed wire representation.

pub mod codec;

pub use codec::{TokenCodec, generate_opaque_token};
