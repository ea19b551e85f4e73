use std::time::Duration;

use anyhow::{anyhow, Context, Error, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::settings::PortalConfig;
use crate::helpers::time::format_millis;
use crate::sources::{ExchangeCredentials, ExchangeRequest, ResolvedCredentials};
use crate::utils::constants::{ROLE_CREDENTIALS_PATH, SSO_BEARER_TOKEN_HEADER};

/// Client for the SSO portal `GetRoleCredentials` operation.
#[derive(Debug, Clone)]
pub struct SsoPortalClient {
    client: Client,
    endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetRoleCredentialsResponse {
    role_credentials: RoleCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    expiration: i64,
}

impl From<RoleCredentials> for ResolvedCredentials {
    fn from(c: RoleCredentials) -> Self {
        Self {
            access_key_id: c.access_key_id,
            secret_access_key: c.secret_access_key,
            session_token: c.session_token,
            expiration: c.expiration,
        }
    }
}

impl SsoPortalClient {
    pub fn new(client: Client, endpoint: Option<String>) -> Self {
        Self { client, endpoint }
    }

    pub fn from_config(cfg: &PortalConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::new(client, cfg.endpoint.to_owned()))
    }

    pub fn endpoint_for(&self, region: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_owned(),
            None => format!("https://portal.sso.{}.amazonaws.com", region),
        }
    }
}

impl ExchangeCredentials for SsoPortalClient {
    async fn exchange(&self, request: ExchangeRequest<'_>) -> Result<ResolvedCredentials, Error> {
        let url = format!("{}{}", self.endpoint_for(request.region), ROLE_CREDENTIALS_PATH);
        info!(
            "requesting role credentials: account {}, role {}, region {}",
            request.account_id, request.role_name, request.region
        );

        let response = self
            .client
            .get(&url)
            .query(&[("role_name", request.role_name), ("account_id", request.account_id)])
            .header(SSO_BEARER_TOKEN_HEADER, request.access_token)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        let body = response.text().await.context("failed to read SSO portal response")?;
        if !status.is_success() {
            return Err(anyhow!("SSO portal returned {}: {}", status, body.trim()));
        }

        let parsed: GetRoleCredentialsResponse =
            serde_json::from_str(&body).context("unexpected SSO portal response")?;
        let credentials = ResolvedCredentials::from(parsed.role_credentials);
        debug!("role credentials expire at {}", format_millis(credentials.expiration));
        Ok(credentials)
    }
}
