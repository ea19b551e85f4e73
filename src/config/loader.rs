use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{LoggingConfig, Settings};

/// Load settings from a YAML file, expanding `${VAR}` / `${VAR:default}` first.
pub async fn file_to_settings(path: &Path) -> Result<Settings> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read settings file {}", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_settings(&expanded)
}

pub fn parse_settings(content: &str) -> Result<Settings> {
    if content.trim().is_empty() {
        debug!("settings file is empty, using defaults");
        return Ok(apply_defaults(Settings::default()));
    }

    let settings: Settings = serde_yaml::from_str(content).inspect_err(|e| {
        error!("parse settings error: {}", e);
    })?;

    Ok(apply_defaults(settings))
}

fn apply_defaults(mut settings: Settings) -> Settings {
    if settings.logging.is_none() {
        settings.logging = Some(LoggingConfig::default());
    }
    settings
}

pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
