use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::token::{CachedToken, TokenCacheEntry};
use crate::helpers::time::parse_sso_expiry;

/// Directory of SSO login artifacts (`~/.aws/sso/cache`).
#[derive(Debug, Clone)]
pub struct TokenCache {
    dir: PathBuf,
}

impl TokenCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn get_valid_token(&self) -> Option<CachedToken> {
        self.get_valid_token_at(Utc::now()).await
    }

    /// First entry, in directory order, holding a non-empty token that expires after `now`.
    /// Broken entries never fail the scan.
    pub async fn get_valid_token_at(&self, now: DateTime<Utc>) -> Option<CachedToken> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("sso cache directory {} does not exist", self.dir.display());
                return None;
            }
            Err(e) => {
                warn!("sso cache directory {} is not readable: {}", self.dir.display(), e);
                return None;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("sso cache scan stopped: {}", e);
                    break;
                }
            };

            let path = entry.path();
            let Some(token) = read_cache_entry(&path).await else {
                continue;
            };
            if token.is_valid_at(now) {
                info!("using sso token from {}, expires at {}", path.display(), token.expires_at);
                return Some(token);
            }
            debug!("skipping {}: token expired at {}", path.display(), token.expires_at);
        }

        info!("no valid sso token in {}", self.dir.display());
        None
    }
}

async fn read_cache_entry(path: &Path) -> Option<CachedToken> {
    let content = tokio::fs::read_to_string(path)
        .await
        .inspect_err(|e| debug!("skipping {}: {}", path.display(), e))
        .ok()?;

    let entry: TokenCacheEntry = serde_json::from_str(&content)
        .inspect_err(|e| debug!("skipping {}: not a token document: {}", path.display(), e))
        .ok()?;

    let value = entry.access_token.filter(|t| !t.is_empty())?;
    let expires_at = entry.expires_at.as_deref().and_then(parse_sso_expiry).or_else(|| {
        debug!("skipping {}: missing or unparsable expiresAt", path.display());
        None
    })?;

    Some(CachedToken::new(value, expires_at))
}
