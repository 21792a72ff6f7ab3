//! Humanity verification client
//!
//! Connects a wallet, asks the Humanity Protocol API (directly or through the
//! verification proxy) whether it belongs to a human, and keeps the result and an
//! activity log in one serializable state.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

/// Bounded activity log
pub mod activity;

/// Verification requests
pub mod api;

/// Command line configuration
pub mod cli;

/// Wallet connection and verification steps
pub mod flow;

/// User-facing notices
pub mod notice;

/// Terminal rendering
pub mod render;

/// Connected wallet
pub mod session;

/// Flow state and reducer
pub mod state;

/// Wallet provider seam
pub mod wallet;
