//! # SSO credential refresher
//!
//! Resolves temporary role credentials for an AWS SSO profile: picks a
//! cached SSO access token (running the interactive login when none is
//! valid), exchanges it at the SSO portal, and writes the result into the
//! shared credentials file, optionally under a second alias name.
//!
//! Modules:
//! - `config`: settings file and SSO profile lookup
//! - `cache`: SSO token cache scanning
//! - `login`: interactive login subprocess
//! - `sources`: token to role credential exchange
//! - `sinks`: credentials file persistence
//! - `engine`: the refresh state machine

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod helpers;
pub mod login;
pub mod sinks;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::engine::refresh::{RefreshEngine, RefreshOutcome, RefreshRequest};
pub use crate::errors::RefreshError;
