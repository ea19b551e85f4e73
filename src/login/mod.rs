//! Interactive SSO login.
//!
//! The login tool writes its token into the SSO cache as a side effect, so a
//! successful login returns nothing and callers re-scan the token cache.

use std::future::Future;
use std::io;

use thiserror::Error;

pub mod command;

/// Why an interactive login did not succeed.
#[derive(Debug, Error)]
pub enum LoginFailure {
    #[error("login process exited with code {0}")]
    ExitCode(i32),
    #[error("login process was terminated by signal {0}")]
    Signal(i32),
    #[error("login process could not be started: {0}")]
    Spawn(#[source] io::Error),
}

pub trait InteractiveLogin {
    /// Run the login for `profile`, blocking until it finishes.
    fn login(&self, profile: &str) -> impl Future<Output = Result<(), LoginFailure>> + Send;
}
