use std::io::{Read, Write};

use anyhow::Result;
use clap::Args as ClapArgs;

use crate::config;
use crate::dashboard::bar::{parse_width, DEFAULT_BAR_WIDTH};
use crate::dashboard::{self, RenderOptions, StatusInput, UpdateNotice};
use crate::error::StatuslineError;
use crate::git::GitSummarizer;

/// Arguments for rendering the dashboard (the default command).
#[derive(ClapArgs, Debug, Default)]
pub struct Args {
    /// Progress bar width in cells, 10-100 (default: 50)
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    pub width: Option<String>,
}

/// Read one payload from stdin and write the two dashboard lines.
///
/// Invalid JSON or a non-object payload is the only failure; it returns
/// before anything is written to stdout.
pub fn run(args: Args) -> Result<()> {
    let raw = read_stdin()?;
    let input = StatusInput::parse(&raw)?;

    let config = config::load();
    let width = resolve_width(args.width.as_deref(), config.width);
    // Claude Code pipes stdout, so colored would switch itself off.
    // Force it on unless NO_COLOR is set.
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else {
        colored::control::set_override(true);
    }

    let working_dir = input.working_directory.as_deref();
    let git = GitSummarizer::default().summarize(working_dir.unwrap_or(""));
    let claude_home = config::claude_home();
    let update = UpdateNotice::check(&config.update, working_dir, claude_home.as_deref());

    let lines = dashboard::render(
        &input,
        &git,
        update.as_ref(),
        &RenderOptions {
            width,
            segments: &config.segments,
        },
    );

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(lines.to_output().as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Blocks until stdin closes.
fn read_stdin() -> Result<String, StatuslineError> {
    let mut buf = String::new();
    std::io::stdin().lock().read_to_string(&mut buf)?;
    Ok(buf)
}

/// `--width` if valid, then the configured width if valid, then 50.
fn resolve_width(arg: Option<&str>, configured: u16) -> u16 {
    if let Some(raw) = arg {
        match parse_width(raw) {
            Some(w) => return w,
            None => tracing::debug!(width = raw, "ignoring invalid --width"),
        }
    }
    parse_width(&configured.to_string()).unwrap_or(DEFAULT_BAR_WIDTH)
}
