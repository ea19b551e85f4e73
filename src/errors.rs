use std::path::PathBuf;

use thiserror::Error;

use crate::login::LoginFailure;

/// Terminal failures of a single refresh invocation. None of them is retried.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("AWS config file {path} not found; run `aws configure sso` to set up an SSO profile")]
    ConfigMissing { path: PathBuf },

    #[error("AWS config file {path} could not be read: {message}")]
    ConfigUnreadable { path: PathBuf, message: String },

    #[error("profile '{profile}' not found in {path}")]
    ProfileNotFound { profile: String, path: PathBuf },

    /// Lists what is missing and restates that all three fields are required.
    #[error(
        "profile '{profile}' is not an SSO profile: missing {}; sso_region, sso_account_id and sso_role_name are all required",
        .missing.join(", ")
    )]
    InvalidProfile {
        profile: String,
        missing: Vec<&'static str>,
    },

    #[error("SSO login for profile '{profile}' failed ({source}); run `aws sso login --profile {profile}` manually")]
    LoginFailed {
        profile: String,
        #[source]
        source: LoginFailure,
    },

    #[error("could not exchange the SSO token for role credentials of profile '{profile}': {source:#}; run `aws sso login --profile {profile}` and try again")]
    ExchangeFailed {
        profile: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("credentials file {path} could not be read: {message}")]
    CredentialsUnreadable { path: PathBuf, message: String },

    #[error("failed to write credentials file {path}: {source:#}")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl RefreshError {
    /// Process exit status reported by the CLI.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
