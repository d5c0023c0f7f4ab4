//! Turnstile API server library.
//!
//! Exposes the session engine, cookie binding, extractors, routes and router
//! builder so integration tests and the binary entrypoint share them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
