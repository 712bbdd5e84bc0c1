//! Business logic behind the HTTP handlers.

pub mod ai;
pub mod auth;
