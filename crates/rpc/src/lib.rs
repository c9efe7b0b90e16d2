//! HTTP surface for the Verity provenance registry.
//!
//! A thin axum layer over [`verity_registry::Registry`]: request shaping,
//! status-code mapping for the registry's typed errors, and the event-feed
//! endpoint. No business logic lives here.

pub mod content;
pub mod identity;
pub mod reuse;
pub mod server;

pub use server::{start_server, AppState};

#[cfg(test)]
mod api_tests;
