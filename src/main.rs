mod cli;
mod config;
mod dashboard;
mod error;
mod git;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

/// Log filter variable; logging is off unless it is set.
const LOG_ENV: &str = "STATUSLINE_LOG";

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();

    let cli = Cli::parse_lenient();

    match cli.command {
        None => cli::statusline::run(cli.render),
        Some(Command::Install(args)) => cli::install::run_install(args),
        Some(Command::Uninstall(args)) => cli::install::run_uninstall(args),
    }
}
