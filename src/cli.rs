//! Command-line entry point: wires settings, logging and the refresh engine.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use crate::cache::token_cache::TokenCache;
use crate::config::profile::ProfileStore;
use crate::config::settings::Settings;
use crate::engine::refresh::{RefreshEngine, RefreshOutcome, RefreshRequest};
use crate::helpers::time::format_millis;
use crate::login::command::CommandLogin;
use crate::sinks::credentials_file::CredentialStore;
use crate::sources::sso_portal::SsoPortalClient;
use crate::utils::constants::DEFAULT_PROFILE;
use crate::utils::logging::LogLevel;
use crate::utils::{config_loader, logging};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// SSO profile to resolve credentials for
    #[arg(env = "AWS_PROFILE", default_value = DEFAULT_PROFILE)]
    pub profile: String,
    /// Also store the credentials under this name
    pub alias: Option<String>,
    #[arg(short, long, env = "SSO_REFRESH_SETTINGS")]
    pub settings: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    pub log_level: Option<LogLevel>,
}

pub async fn run(args: Args) -> ExitCode {
    let settings = match config_loader::run(args.settings.as_deref()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::run(&settings, args.log_level);

    let request = RefreshRequest::new(args.profile).with_alias(args.alias);
    match refresh(&settings, &request).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Setup failures are `Err`; refresh failures are logged and mapped to their exit code.
pub async fn refresh(settings: &Settings, request: &RefreshRequest) -> Result<u8> {
    let paths = settings.paths.resolve()?;
    let engine = RefreshEngine::new(
        ProfileStore::new(paths.aws_config),
        CredentialStore::new(paths.credentials),
        TokenCache::new(paths.sso_cache),
        CommandLogin::from_config(&settings.login),
        SsoPortalClient::from_config(&settings.portal)?,
    );

    match engine.resolve(request).await {
        Ok(RefreshOutcome::Refreshed { expiration }) => {
            info!("profile '{}' ready until {}", request.profile, format_millis(expiration));
            Ok(0)
        }
        Ok(RefreshOutcome::AliasCopied { expiration }) => {
            info!(
                "profile '{}' reused for '{}' until {}",
                request.profile,
                request.alias.as_deref().unwrap_or_default(),
                format_millis(expiration)
            );
            Ok(0)
        }
        Err(e) => {
            error!("{}", e);
            Ok(e.exit_code())
        }
    }
}
