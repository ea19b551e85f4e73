use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ini::{Ini, Properties};
use tracing::{debug, info};

use crate::errors::RefreshError;
use crate::utils::constants::{
    DEFAULT_PROFILE, FIELD_SSO_ACCOUNT_ID, FIELD_SSO_REGION, FIELD_SSO_ROLE_NAME, FIELD_SSO_SESSION,
    PROFILE_SECTION_PREFIX, REQUIRED_PROFILE_FIELDS, SSO_SESSION_SECTION_PREFIX,
};

/// SSO coordinates of one profile. All fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    pub sso_region: String,
    pub account_id: String,
    pub role_name: String,
}

/// Read-only view of the AWS config file.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load and validate `name`. The file is re-read on every call.
    pub async fn load_profile(&self, name: &str) -> Result<ProfileConfig, RefreshError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RefreshError::ConfigMissing { path: self.path.clone() });
            }
            Err(e) => {
                return Err(RefreshError::ConfigUnreadable {
                    path: self.path.clone(),
                    message: e.to_string(),
                });
            }
        };

        let ini = Ini::load_from_str(&content).map_err(|e| RefreshError::ConfigUnreadable {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let profile = profile_from_ini(&ini, name, &self.path)?;
        info!(
            "profile '{}' resolved: account {}, role {}, region {}",
            name, profile.account_id, profile.role_name, profile.sso_region
        );
        Ok(profile)
    }
}

/// `[profile <name>]`, or `[default]` when `name` is the default profile.
fn find_section<'a>(ini: &'a Ini, name: &str) -> Option<&'a Properties> {
    let key = format!("{}{}", PROFILE_SECTION_PREFIX, name);
    ini.section(Some(key.as_str())).or_else(|| {
        if name == DEFAULT_PROFILE {
            debug!("section '{}' not found, falling back to '[{}]'", key, DEFAULT_PROFILE);
            ini.section(Some(DEFAULT_PROFILE))
        } else {
            None
        }
    })
}

pub fn profile_from_ini(ini: &Ini, name: &str, path: &Path) -> Result<ProfileConfig, RefreshError> {
    let section = find_section(ini, name).ok_or_else(|| RefreshError::ProfileNotFound {
        profile: name.to_owned(),
        path: path.to_path_buf(),
    })?;

    let sso_region = non_empty(section, FIELD_SSO_REGION).or_else(|| session_region(ini, section));
    let account_id = non_empty(section, FIELD_SSO_ACCOUNT_ID);
    let role_name = non_empty(section, FIELD_SSO_ROLE_NAME);

    match (sso_region, account_id, role_name) {
        (Some(sso_region), Some(account_id), Some(role_name)) => Ok(ProfileConfig {
            sso_region,
            account_id,
            role_name,
        }),
        (sso_region, account_id, role_name) => {
            let absent = [sso_region.is_none(), account_id.is_none(), role_name.is_none()];
            let missing = REQUIRED_PROFILE_FIELDS
                .into_iter()
                .zip(absent)
                .filter_map(|(field, is_absent)| is_absent.then_some(field))
                .collect();

            Err(RefreshError::InvalidProfile {
                profile: name.to_owned(),
                missing,
            })
        }
    }
}

fn non_empty(section: &Properties, field: &str) -> Option<String> {
    section
        .get(field)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Region from the `[sso-session <name>]` block the profile points at.
fn session_region(ini: &Ini, section: &Properties) -> Option<String> {
    let session = non_empty(section, FIELD_SSO_SESSION)?;
    let key = format!("{}{}", SSO_SESSION_SECTION_PREFIX, session);
    ini.section(Some(key.as_str()))
        .and_then(|s| non_empty(s, FIELD_SSO_REGION))
}
