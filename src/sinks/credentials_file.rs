use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::errors::RefreshError;
use crate::sources::ResolvedCredentials;
use crate::utils::constants::{FIELD_ACCESS_KEY_ID, FIELD_EXPIRATION, FIELD_SECRET_ACCESS_KEY, FIELD_SESSION_TOKEN};

/// In-memory credentials file: profile (or alias) name -> section.
///
/// Sections the tool does not own are carried through load/save untouched.
#[derive(Debug, Clone, Default)]
pub struct CredentialsDocument {
    ini: Ini,
}

impl CredentialsDocument {
    pub fn new() -> Self {
        Self { ini: Ini::new() }
    }

    /// Values are kept as written: no quote stripping, no escape processing.
    pub fn parse(content: &str) -> Result<Self> {
        let option = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..Default::default()
        };
        Ok(Self {
            ini: Ini::load_from_str_opt(content, option)?,
        })
    }

    pub fn contains(&self, profile: &str) -> bool {
        self.ini.section(Some(profile)).is_some()
    }

    pub fn get(&self, profile: &str, field: &str) -> Option<&str> {
        self.ini.section(Some(profile)).and_then(|s| s.get(field))
    }

    /// Complete credentials for `profile`, if all four fields are present.
    pub fn entry(&self, profile: &str) -> Option<ResolvedCredentials> {
        let section = self.ini.section(Some(profile))?;
        Some(ResolvedCredentials {
            access_key_id: section.get(FIELD_ACCESS_KEY_ID)?.to_owned(),
            secret_access_key: section.get(FIELD_SECRET_ACCESS_KEY)?.to_owned(),
            session_token: section.get(FIELD_SESSION_TOKEN)?.to_owned(),
            expiration: section.get(FIELD_EXPIRATION)?.trim().parse().ok()?,
        })
    }

    pub fn expiration(&self, profile: &str) -> Option<i64> {
        self.get(profile, FIELD_EXPIRATION)?.trim().parse().ok()
    }

    /// Fresh means a numeric expiration strictly after `now_millis`.
    pub fn is_fresh(&self, profile: &str, now_millis: i64) -> bool {
        self.expiration(profile)
            .map(|exp| exp > now_millis)
            .unwrap_or(false)
    }

    pub fn upsert(&mut self, profile: &str, credentials: &ResolvedCredentials) {
        self.ini
            .with_section(Some(profile))
            .set(FIELD_ACCESS_KEY_ID, credentials.access_key_id.as_str())
            .set(FIELD_SECRET_ACCESS_KEY, credentials.secret_access_key.as_str())
            .set(FIELD_SESSION_TOKEN, credentials.session_token.as_str())
            .set(FIELD_EXPIRATION, credentials.expiration.to_string());
    }

    /// Copy `source` verbatim under `alias`, replacing whatever the alias held.
    /// Returns false when `source` has no section.
    pub fn copy_alias(&mut self, source: &str, alias: &str) -> bool {
        if source == alias {
            return self.contains(source);
        }
        let Some(properties) = self.ini.section(Some(source)).cloned() else {
            warn!("cannot alias '{}' as '{}': no such section", source, alias);
            return false;
        };

        self.ini.delete(Some(alias));
        self.ini.entry(Some(alias.to_owned())).or_insert(properties);
        debug!("copied credentials of '{}' to '{}'", source, alias);
        true
    }

    pub fn profiles(&self) -> Vec<String> {
        self.ini.sections().flatten().map(str::to_owned).collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let option = WriteOption {
            escape_policy: EscapePolicy::Nothing,
            ..Default::default()
        };
        self.ini.write_to_opt(&mut buf, option)?;
        Ok(buf)
    }
}

/// The shared credentials file (`~/.aws/credentials`).
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty document.
    pub async fn load(&self) -> Result<CredentialsDocument, RefreshError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("credentials file {} does not exist yet", self.path.display());
                return Ok(CredentialsDocument::new());
            }
            Err(e) => {
                return Err(RefreshError::CredentialsUnreadable {
                    path: self.path.clone(),
                    message: e.to_string(),
                })
            }
        };

        CredentialsDocument::parse(&content).map_err(|e| RefreshError::CredentialsUnreadable {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    pub async fn save(&self, document: &CredentialsDocument) -> Result<(), RefreshError> {
        self.write_atomic(document)
            .await
            .map_err(|source| RefreshError::PersistFailed {
                path: self.path.clone(),
                source,
            })?;
        info!("credentials written to {}", self.path.display());
        Ok(())
    }

    /// Whole document to `<path>.tmp` (created 0600), then rename over the target.
    async fn write_atomic(&self, document: &CredentialsDocument) -> Result<()> {
        let bytes = document.to_bytes()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let tmp = tmp_path(&self.path);
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options
            .open(&tmp)
            .await
            .with_context(|| format!("failed to create {}", tmp.display()))?;

        // a leftover tmp file keeps its old mode
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
        }

        file.write_all(&bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e).with_context(|| format!("failed to replace {}", self.path.display()));
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
