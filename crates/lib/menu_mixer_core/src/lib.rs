//! # menu_mixer_core
//!
//! Core domain logic for the Menu Mixer gateway: bearer tokens, the invite
//! registry, the monthly usage ledger, storage backends and the AI provider.

pub mod ai;
pub mod auth;
pub mod invite;
pub mod migrate;
pub mod models;
pub mod store;
pub mod tier;
pub mod usage;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
