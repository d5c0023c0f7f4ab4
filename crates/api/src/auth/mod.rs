//! Authentication primitives.
//!
//! - [`session`] -- the opaque rotating session engine ([`session::SessionManager`]).
//! - [`cookies`] -- mapping session state onto the token and rotation-hint cookies.
//! - [`password`] -- Argon2id password hashing and login verification.

pub mod cookies;
pub mod password;
pub mod session;
