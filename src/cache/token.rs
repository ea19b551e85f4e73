use chrono::{DateTime, Utc};
use serde::Deserialize;

/// SSO access token picked from the login tool's cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(value: String, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && self.expires_at > now
    }
}

/// One cache document. Client registration files share the directory and
/// carry no `accessToken`, hence the options.
#[derive(Debug, Deserialize)]
pub struct TokenCacheEntry {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
    #[serde(rename = "expiresAt")]
    pub expires_at: Option<String>,
}
