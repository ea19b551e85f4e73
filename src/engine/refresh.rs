use std::fmt;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::cache::token::CachedToken;
use crate::cache::token_cache::TokenCache;
use crate::config::profile::{ProfileConfig, ProfileStore};
use crate::errors::RefreshError;
use crate::helpers::time::{format_millis, now_millis};
use crate::login::InteractiveLogin;
use crate::sinks::credentials_file::{CredentialStore, CredentialsDocument};
use crate::sources::{ExchangeCredentials, ExchangeRequest, ResolvedCredentials};

/// Profile to resolve, plus an optional second name for the same credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub profile: String,
    pub alias: Option<String>,
}

impl RefreshRequest {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias.filter(|a| !a.trim().is_empty());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Cached credentials were fresh and only copied to the alias.
    AliasCopied { expiration: i64 },
    /// New credentials were exchanged and written.
    Refreshed { expiration: i64 },
}

/// Progress of one invocation. Failures leave the machine through `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Start,
    ConfigValidated,
    CacheChecked,
    ShortCircuitAlias,
    TokenReady,
    CredentialsExchanged,
    Persisted,
    Done,
}

impl fmt::Display for RefreshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub struct RefreshEngine<L, X> {
    profiles: ProfileStore,
    credentials: CredentialStore,
    tokens: TokenCache,
    login: L,
    exchanger: X,
}

impl<L, X> RefreshEngine<L, X>
where
    L: InteractiveLogin,
    X: ExchangeCredentials,
{
    pub fn new(
        profiles: ProfileStore,
        credentials: CredentialStore,
        tokens: TokenCache,
        login: L,
        exchanger: X,
    ) -> Self {
        Self {
            profiles,
            credentials,
            tokens,
            login,
            exchanger,
        }
    }

    pub async fn resolve(&self, request: &RefreshRequest) -> Result<RefreshOutcome, RefreshError> {
        let profile_name = request.profile.as_str();
        let alias = request.alias.as_deref();
        let mut state = RefreshState::Start;
        debug!("refresh '{}' (alias: {:?}): {}", profile_name, alias, state);

        // 1. profile
        let profile = self
            .profiles
            .load_profile(profile_name)
            .await
            .inspect_err(|e| warn!("refresh '{}' aborted in {}: {}", profile_name, state, e))?;
        state = transition(state, RefreshState::ConfigValidated);

        // 2. cached credentials
        let mut document = self.credentials.load().await?;
        state = transition(state, RefreshState::CacheChecked);

        if let Some(alias) = alias {
            if document.is_fresh(profile_name, now_millis()) {
                return self.short_circuit_alias(document, profile_name, alias, state).await;
            }
        } else if document.is_fresh(profile_name, now_millis()) {
            // Fresh credentials are only reused for alias requests; the primary
            // profile is always re-exchanged.
            debug!("cached credentials for '{}' are fresh, refreshing anyway", profile_name);
        }

        // 3. token
        let token = self.acquire_token(profile_name).await?;
        state = transition(state, RefreshState::TokenReady);

        // 4. exchange
        let credentials = self
            .exchange(profile_name, &profile, token.as_ref())
            .await
            .inspect_err(|e| warn!("refresh '{}' aborted in {}: {}", profile_name, state, e))?;
        state = transition(state, RefreshState::CredentialsExchanged);

        // 5. write back
        document.upsert(profile_name, &credentials);
        if let Some(alias) = alias {
            document.copy_alias(profile_name, alias);
        }
        self.credentials.save(&document).await?;
        state = transition(state, RefreshState::Persisted);

        transition(state, RefreshState::Done);
        info!(
            "credentials for '{}' refreshed, valid until {}",
            profile_name,
            format_millis(credentials.expiration)
        );
        Ok(RefreshOutcome::Refreshed {
            expiration: credentials.expiration,
        })
    }

    async fn short_circuit_alias(
        &self,
        mut document: CredentialsDocument,
        profile_name: &str,
        alias: &str,
        state: RefreshState,
    ) -> Result<RefreshOutcome, RefreshError> {
        let state = transition(state, RefreshState::ShortCircuitAlias);
        let expiration = document.expiration(profile_name).unwrap_or_default();
        info!(
            "credentials for '{}' still valid until {}, copying to '{}'",
            profile_name,
            format_millis(expiration),
            alias
        );

        document.copy_alias(profile_name, alias);
        self.credentials.save(&document).await?;
        transition(state, RefreshState::Done);
        Ok(RefreshOutcome::AliasCopied { expiration })
    }

    /// Cached token, or one interactive login followed by a single re-scan.
    async fn acquire_token(&self, profile_name: &str) -> Result<Option<CachedToken>, RefreshError> {
        if let Some(token) = self.tokens.get_valid_token().await {
            return Ok(Some(token));
        }

        info!("no valid SSO token cached, starting login for '{}'", profile_name);
        self.login
            .login(profile_name)
            .await
            .map_err(|source| RefreshError::LoginFailed {
                profile: profile_name.to_owned(),
                source,
            })?;

        let token = self.tokens.get_valid_token().await;
        if token.is_none() {
            warn!("login for '{}' succeeded but no valid token was cached", profile_name);
        }
        Ok(token)
    }

    async fn exchange(
        &self,
        profile_name: &str,
        profile: &ProfileConfig,
        token: Option<&CachedToken>,
    ) -> Result<ResolvedCredentials, RefreshError> {
        let exchange_failed = |source: anyhow::Error| RefreshError::ExchangeFailed {
            profile: profile_name.to_owned(),
            source,
        };

        let token = token.ok_or_else(|| {
            exchange_failed(anyhow!(
                "no valid SSO access token in {}",
                self.tokens.dir().display()
            ))
        })?;

        self.exchanger
            .exchange(ExchangeRequest {
                access_token: &token.value,
                account_id: &profile.account_id,
                role_name: &profile.role_name,
                region: &profile.sso_region,
            })
            .await
            .map_err(exchange_failed)
    }
}

fn transition(from: RefreshState, to: RefreshState) -> RefreshState {
    debug!("refresh state: {} -> {}", from, to);
    to
}
