use std::process::ExitCode;

use clap::Parser;
use sso_refresh::cli::{self, Args};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::run(args).await
}
