//! Request guards for authenticated and billable routes.
//!
//! Layer order on billable routes is auth → quota → handler: the usage ledger
//! is never consulted for an unauthenticated request and the provider is
//! never called for an over-quota one.

pub mod auth;
pub mod quota;
