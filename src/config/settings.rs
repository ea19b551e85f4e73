use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_LOGIN_ARGS, DEFAULT_LOGIN_PROGRAM};

/// ================================
/// Tool-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub login: LoginConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    pub logging: Option<LoggingConfig>,
}

/// ================================
/// Files
/// ================================
/// Unset entries fall back to the AWS CLI layout under the home directory.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PathsConfig {
    pub aws_config: Option<PathBuf>,
    pub credentials: Option<PathBuf>,
    pub sso_cache: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub aws_config: PathBuf,
    pub credentials: PathBuf,
    pub sso_cache: PathBuf,
}

impl PathsConfig {
    pub fn resolve(&self) -> Result<ResolvedPaths> {
        Ok(ResolvedPaths {
            aws_config: or_aws_home(
                self.aws_config.clone().or_else(|| env_path("AWS_CONFIG_FILE")),
                &["config"],
            )?,
            credentials: or_aws_home(
                self.credentials.clone().or_else(|| env_path("AWS_SHARED_CREDENTIALS_FILE")),
                &["credentials"],
            )?,
            sso_cache: or_aws_home(self.sso_cache.clone(), &["sso", "cache"])?,
        })
    }
}

fn or_aws_home(path: Option<PathBuf>, relative: &[&str]) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => Ok(relative.iter().fold(aws_home()?, |acc, part| acc.join(part))),
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var(var).ok().filter(|v| !v.trim().is_empty()).map(PathBuf::from)
}

fn aws_home() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".aws"))
        .ok_or_else(|| anyhow!("failed to determine the home directory"))
}

/// ================================
/// Interactive login
/// ================================
/// The profile name is appended after `args`.
#[derive(Debug, Deserialize, Clone)]
pub struct LoginConfig {
    #[serde(default = "default_login_program")]
    pub program: String,
    #[serde(default = "default_login_args")]
    pub args: Vec<String>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            program: default_login_program(),
            args: default_login_args(),
        }
    }
}

fn default_login_program() -> String {
    DEFAULT_LOGIN_PROGRAM.to_owned()
}

fn default_login_args() -> Vec<String> {
    DEFAULT_LOGIN_ARGS.iter().map(|a| a.to_string()).collect()
}

/// ================================
/// SSO portal
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct PortalConfig {
    /// replaces `https://portal.sso.<region>.amazonaws.com`
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(default_log_level(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}
