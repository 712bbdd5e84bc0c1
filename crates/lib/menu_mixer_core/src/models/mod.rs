//! Domain models shared by the gateway crates.

pub mod auth;
pub mod invite;
pub mod usage;
