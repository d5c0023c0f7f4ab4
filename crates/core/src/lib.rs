//! Domain types and pure logic shared by the persistence and HTTP layers.
//!
//! Nothing in this crate performs I/O; every function that depends on the
//! current time takes it as an argument.

pub mod account;
pub mod error;
pub mod session;
pub mod token;
pub mod types;
