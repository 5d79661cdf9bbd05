pub mod install;
pub mod output;
pub mod statusline;

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

/// Gradient two-line status dashboard for Claude Code.
///
/// Without a subcommand, reads Claude Code's JSON payload from stdin and
/// prints the dashboard.
#[derive(Parser)]
#[command(
    name = "statusline",
    version,
    about,
    long_about = None,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub render: statusline::Args,
}

#[derive(Subcommand)]
pub enum Command {
    /// Configure Claude Code to use this statusline
    Install(install::InstallArgs),

    /// Remove this statusline from Claude Code's settings
    Uninstall(install::UninstallArgs),
}

const SUBCOMMANDS: &[&str] = &["install", "uninstall"];

impl Cli {
    /// Parse the process arguments. See [`Cli::parse_lenient_from`].
    pub fn parse_lenient() -> Self {
        Self::parse_lenient_from(std::env::args_os())
    }

    /// Like `Cli::parse`, except that bad arguments on the render path fall
    /// back to defaults instead of exiting: Claude Code must always get a
    /// dashboard. Help, version and subcommand errors still exit via clap.
    pub fn parse_lenient_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        match Self::try_parse_from(&args) {
            Ok(cli) => cli,
            Err(e) if is_render_path(&args) && !is_informational(e.kind()) => {
                tracing::debug!(error = %e, "ignoring invalid arguments");
                Self {
                    command: None,
                    render: statusline::Args {
                        width: lenient_width(&args),
                    },
                }
            }
            Err(e) => e.exit(),
        }
    }
}

fn is_informational(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

fn is_render_path(args: &[OsString]) -> bool {
    !args
        .iter()
        .skip(1)
        .any(|a| a.to_str().is_some_and(|a| SUBCOMMANDS.contains(&a)))
}

/// The last `--width N` or `--width=N` value, if one was given.
fn lenient_width(args: &[OsString]) -> Option<String> {
    let mut width = None;
    let mut iter = args.iter().skip(1).filter_map(|a| a.to_str());
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--width=") {
            width = Some(value.to_string());
        } else if arg == "--width" {
            width = iter.next().map(str::to_string);
        }
    }
    width
}
