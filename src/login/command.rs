use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::settings::LoginConfig;
use crate::login::{InteractiveLogin, LoginFailure};

/// Runs the external login tool (`aws sso login --profile <name>` by default)
/// with the console attached, so browser prompts and device codes reach the user.
#[derive(Debug, Clone)]
pub struct CommandLogin {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLogin {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    pub fn from_config(cfg: &LoginConfig) -> Self {
        Self::new(cfg.program.to_owned(), cfg.args.to_owned())
    }

    fn command(&self, profile: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(profile)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }
}

impl InteractiveLogin for CommandLogin {
    async fn login(&self, profile: &str) -> Result<(), LoginFailure> {
        info!("starting interactive login: {} {} {}", self.program, self.args.join(" "), profile);
        let status = self
            .command(profile)
            .status()
            .await
            .map_err(LoginFailure::Spawn)?;

        debug!("login process finished: {}", status);
        exit_status_to_result(status).inspect_err(|err| warn!("login for profile '{}' failed: {}", profile, err))
    }
}

fn exit_status_to_result(status: ExitStatus) -> Result<(), LoginFailure> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(LoginFailure::ExitCode(code));
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(LoginFailure::Signal(signal));
        }
    }

    Err(LoginFailure::ExitCode(-1))
}
