//! Role credential sources.
//!
//! An exchanger trades an SSO access token for temporary credentials of one
//! account/role pair. It performs a single call and never retries.

use std::future::Future;

use anyhow::Error;

pub mod sso_portal;

/// Temporary role credentials. `expiration` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct ExchangeRequest<'a> {
    pub access_token: &'a str,
    pub account_id: &'a str,
    pub role_name: &'a str,
    /// region of the SSO portal, passed per call
    pub region: &'a str,
}

pub trait ExchangeCredentials {
    fn exchange(
        &self,
        request: ExchangeRequest<'_>,
    ) -> impl Future<Output = Result<ResolvedCredentials, Error>> + Send;
}
