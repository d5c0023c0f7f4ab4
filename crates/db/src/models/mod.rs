//! Row structs and DTOs.
//!
//! Row structs derive `FromRow` and are never serialized directly when they
//! carry secrets (password hashes, token digests); each has a response type.

pub mod account;
pub mod session;
