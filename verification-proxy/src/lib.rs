//! Humanity verification proxy
//!
//! Forwards wallet verifications to the Humanity Protocol API so the API key stays
//! on the server.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

/// Client for the upstream verification API
pub mod humanity_api;

/// HTTP routes
pub mod routes;

/// Server setup
pub mod server;

/// Configuration and error types
pub mod types;
