use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::config::loader::file_to_settings;
use crate::config::settings::Settings;
use crate::utils::constants::{SETTINGS_DIR_NAME, SETTINGS_FILE_NAME};

/// `<config dir>/sso-refresh/settings.yaml`, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// An explicitly requested settings file must exist; the default one is optional.
pub async fn run(settings_path: Option<&str>) -> Result<Settings> {
    let path = match settings_path {
        Some(path) => PathBuf::from(path),
        None => match default_settings_path().filter(|p| p.exists()) {
            Some(path) => path,
            None => {
                debug!("no settings file in the user config directory, using defaults");
                return Ok(Settings {
                    logging: Some(Default::default()),
                    ..Default::default()
                });
            }
        },
    };

    file_to_settings(&path)
        .await
        .map_err(|e| anyhow!(format!("Invalid settings: {:#}", e)))
}
