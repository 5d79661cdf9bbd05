//! `statusline install` / `statusline uninstall`.
//!
//! One installer for both scopes. What it manages is described by
//! [`TARGET`] and the prompt flow by [`WIDTH_PRESETS`]; the install itself
//! is a read-modify-write of Claude Code's `settings.json`.

use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args as ClapArgs};
use serde_json::Value;

use crate::cli::output;
use crate::config;
use crate::dashboard::bar::{parse_width, DEFAULT_BAR_WIDTH, MAX_BAR_WIDTH, MIN_BAR_WIDTH};

/// Declarative description of the settings entry the installer owns.
pub struct InstallTarget {
    /// Settings file inside the Claude directory.
    pub settings_file: &'static str,
    /// Top-level key holding the statusline entry.
    pub settings_key: &'static str,
    /// Program name that marks an entry as ours.
    pub program: &'static str,
}

pub const TARGET: InstallTarget = InstallTarget {
    settings_file: "settings.json",
    settings_key: "statusLine",
    program: "statusline",
};

pub struct WidthPreset {
    pub choice: &'static str,
    pub label: &'static str,
    pub width: u16,
}

pub const WIDTH_PRESETS: &[WidthPreset] = &[
    WidthPreset {
        choice: "1",
        label: "Compact",
        width: 25,
    },
    WidthPreset {
        choice: "2",
        label: "Medium",
        width: 38,
    },
    WidthPreset {
        choice: "3",
        label: "Full",
        width: 50,
    },
];

const CUSTOM_WIDTH_CHOICE: &str = "4";
const DEFAULT_WIDTH_CHOICE: &str = "3";

#[derive(ClapArgs)]
#[command(group(ArgGroup::new("scope").args(["global", "local"])))]
pub struct InstallArgs {
    /// Install for all projects (Claude home directory)
    #[arg(long, short)]
    pub global: bool,

    /// Install for the current project only (./.claude)
    #[arg(long, short)]
    pub local: bool,

    /// Progress bar width, 10-100
    #[arg(long, value_name = "N")]
    pub width: Option<String>,

    /// Replace an existing statusLine that was not installed by this tool
    #[arg(long)]
    pub force: bool,
}

#[derive(ClapArgs)]
#[command(group(ArgGroup::new("scope").required(true).args(["global", "local"])))]
pub struct UninstallArgs {
    /// Remove from the Claude home directory
    #[arg(long, short)]
    pub global: bool,

    /// Remove from ./.claude
    #[arg(long, short)]
    pub local: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Local,
}

impl Scope {
    fn from_flags(global: bool, local: bool) -> Option<Self> {
        match (global, local) {
            (true, _) => Some(Scope::Global),
            (_, true) => Some(Scope::Local),
            _ => None,
        }
    }

    fn dir(self) -> Result<PathBuf> {
        match self {
            Scope::Global => config::claude_home()
                .context("could not determine home directory; is $HOME set?"),
            Scope::Local => Ok(std::env::current_dir()
                .context("could not determine current directory")?
                .join(".claude")),
        }
    }
}

/// What an install did to the settings object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Added,
    Updated,
    Replaced,
}

pub fn run_install(args: InstallArgs) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();

    let (scope, width) = match Scope::from_flags(args.global, args.local) {
        Some(scope) => (scope, flag_width(args.width.as_deref())),
        None if !interactive => {
            output::info("Non-interactive mode, defaulting to global install");
            (Scope::Global, flag_width(args.width.as_deref()))
        }
        None => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut err = std::io::stderr();
            let prompted = prompt_location(&mut input, &mut err)?
                .map(|scope| prompt_width(&mut input, &mut err).map(|w| w.map(|w| (scope, w))))
                .transpose()?
                .flatten();
            match prompted {
                Some(choice) => choice,
                None => {
                    output::warning("Installation cancelled");
                    return Ok(());
                }
            }
        }
    };

    let target_dir = scope.dir()?;
    output::header(&format!("Installing to {}", display_path(&target_dir)));

    std::fs::create_dir_all(&target_dir)
        .with_context(|| format!("failed to create {}", target_dir.display()))?;

    let settings_path = target_dir.join(TARGET.settings_file);
    let mut settings = read_settings(&settings_path);

    if has_foreign_entry(&settings) && !args.force {
        let existing = settings
            .get(TARGET.settings_key)
            .and_then(|v| v.get("command"))
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();
        output::warning(&format!(
            "{} already configures a different statusline: {}",
            TARGET.settings_file, existing
        ));
        if !interactive || !confirm_replace(&mut std::io::stdin().lock(), &mut std::io::stderr())? {
            output::info("Re-run with --force to replace it: statusline install --force");
            bail!("aborted: {} was not modified", TARGET.settings_file);
        }
    }

    let exe = std::env::current_exe().context("could not locate the statusline executable")?;
    let outcome = apply_install(&mut settings, &statusline_command(&exe, width));
    write_settings(&settings_path, &settings)?;

    let verb = match outcome {
        InstallOutcome::Added => "Configured",
        InstallOutcome::Updated => "Updated",
        InstallOutcome::Replaced => "Replaced the statusline in",
    };
    output::success(&format!(
        "{} {} (width {})",
        verb,
        display_path(&settings_path),
        width
    ));
    output::info("Restart Claude Code to see your new statusline.");
    Ok(())
}

pub fn run_uninstall(args: UninstallArgs) -> Result<()> {
    let scope = Scope::from_flags(args.global, args.local).unwrap_or(Scope::Global);
    let target_dir = scope.dir()?;
    output::header(&format!("Uninstalling from {}", display_path(&target_dir)));

    if !target_dir.exists() {
        output::warning(&format!(
            "Directory does not exist: {}",
            display_path(&target_dir)
        ));
        output::info("Nothing to uninstall.");
        return Ok(());
    }

    let settings_path = target_dir.join(TARGET.settings_file);
    if settings_path.exists() {
        let mut settings = read_settings(&settings_path);
        if apply_uninstall(&mut settings) {
            write_settings(&settings_path, &settings)?;
            output::success(&format!(
                "Removed statusline from {}",
                display_path(&settings_path)
            ));
            output::info("Restart Claude Code to see the change.");
            return Ok(());
        }
    }

    output::warning("No statusline configuration found.");
    Ok(())
}

/// Missing or malformed settings are treated as an empty object.
fn read_settings(path: &Path) -> Value {
    let parsed = std::fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str::<Value>(&contents).ok());
    match parsed {
        Some(value) if value.is_object() => value,
        Some(_) => {
            output::warning(&format!(
                "{} is not a JSON object; starting from an empty one",
                display_path(path)
            ));
            Value::Object(Default::default())
        }
        None => Value::Object(Default::default()),
    }
}

fn write_settings(path: &Path, settings: &Value) -> Result<()> {
    let formatted =
        serde_json::to_string_pretty(settings).context("failed to serialize settings")?;
    std::fs::write(path, formatted + "\n")
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Set the managed entry, reporting what it replaced.
pub fn apply_install(settings: &mut Value, command: &str) -> InstallOutcome {
    if !settings.is_object() {
        *settings = Value::Object(Default::default());
    }
    let outcome = match settings.get(TARGET.settings_key) {
        None => InstallOutcome::Added,
        Some(entry) if is_managed(entry) => InstallOutcome::Updated,
        Some(_) => InstallOutcome::Replaced,
    };
    if let Some(obj) = settings.as_object_mut() {
        obj.insert(
            TARGET.settings_key.to_string(),
            serde_json::json!({
                "type": "command",
                "command": command,
            }),
        );
    }
    outcome
}

/// Remove the managed entry. Entries from other tools are left alone.
pub fn apply_uninstall(settings: &mut Value) -> bool {
    let Some(obj) = settings.as_object_mut() else {
        return false;
    };
    if obj.get(TARGET.settings_key).is_some_and(is_managed) {
        obj.remove(TARGET.settings_key);
        true
    } else {
        false
    }
}

fn has_foreign_entry(settings: &Value) -> bool {
    settings
        .get(TARGET.settings_key)
        .is_some_and(|entry| !is_managed(entry))
}

/// An entry is ours when its command runs a program named `statusline`.
fn is_managed(entry: &Value) -> bool {
    entry
        .get("command")
        .and_then(Value::as_str)
        .and_then(program_of)
        .and_then(|program| Path::new(program).file_name().and_then(|n| n.to_str()))
        .is_some_and(|name| {
            name == TARGET.program
                || name == format!("{}{}", TARGET.program, std::env::consts::EXE_SUFFIX)
        })
}

/// First word of a shell command line, honouring a double-quoted path.
fn program_of(command: &str) -> Option<&str> {
    let command = command.trim_start();
    match command.strip_prefix('"') {
        Some(rest) => rest.split('"').next(),
        None => command.split_whitespace().next(),
    }
}

pub fn statusline_command(exe: &Path, width: u16) -> String {
    let path = exe.display().to_string();
    if path.contains(char::is_whitespace) {
        format!("\"{}\" --width {}", path, width)
    } else {
        format!("{} --width {}", path, width)
    }
}

fn flag_width(raw: Option<&str>) -> u16 {
    match raw {
        None => DEFAULT_BAR_WIDTH,
        Some(raw) => parse_width(raw).unwrap_or_else(|| {
            output::warning(&format!(
                "Invalid width '{}', using default ({})",
                raw, DEFAULT_BAR_WIDTH
            ));
            DEFAULT_BAR_WIDTH
        }),
    }
}

/// Read one answer. `None` on end of input.
fn read_answer(input: &mut impl BufRead, out: &mut impl Write, prompt: &str) -> Result<Option<String>> {
    write!(out, "{}", prompt)?;
    out.flush()?;
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn prompt_location(input: &mut impl BufRead, out: &mut impl Write) -> Result<Option<Scope>> {
    let global = config::claude_home()
        .map(|p| display_path(&p))
        .unwrap_or_else(|| "~/.claude".to_string());
    writeln!(out)?;
    writeln!(out, "Where would you like to install?")?;
    writeln!(out, "  1) Global ({})  available in all your projects", global)?;
    writeln!(out, "  2) Local  (./.claude)  this project only")?;

    let answer = read_answer(input, out, "Choice [1]: ")?;
    Ok(answer.map(|a| if a == "2" { Scope::Local } else { Scope::Global }))
}

pub fn prompt_width(input: &mut impl BufRead, out: &mut impl Write) -> Result<Option<u16>> {
    writeln!(out)?;
    writeln!(out, "Progress bar width?")?;
    for preset in WIDTH_PRESETS {
        writeln!(
            out,
            "  {}) {:<8} {} bars",
            preset.choice, preset.label, preset.width
        )?;
    }
    writeln!(out, "  {}) Custom   enter your own number", CUSTOM_WIDTH_CHOICE)?;

    let Some(answer) = read_answer(input, out, &format!("Choice [{}]: ", DEFAULT_WIDTH_CHOICE))?
    else {
        return Ok(None);
    };
    let choice = if answer.is_empty() {
        DEFAULT_WIDTH_CHOICE
    } else {
        answer.as_str()
    };

    if choice == CUSTOM_WIDTH_CHOICE {
        let prompt = format!("Number of bars ({}-{}): ", MIN_BAR_WIDTH, MAX_BAR_WIDTH);
        let Some(raw) = read_answer(input, out, &prompt)? else {
            return Ok(None);
        };
        let width = match parse_width(&raw) {
            Some(width) => width,
            None => {
                writeln!(out, "Invalid number, using default ({})", DEFAULT_BAR_WIDTH)?;
                DEFAULT_BAR_WIDTH
            }
        };
        return Ok(Some(width));
    }

    Ok(Some(
        WIDTH_PRESETS
            .iter()
            .find(|p| p.choice == choice)
            .map_or(DEFAULT_BAR_WIDTH, |p| p.width),
    ))
}

fn confirm_replace(input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    let answer = read_answer(input, out, "Replace it? [y/N] ")?.unwrap_or_default();
    let answer = answer.to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Path with the home directory shown as `~`.
fn display_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt_width_with(answers: &str) -> Option<u16> {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut out = Vec::new();
        prompt_width(&mut input, &mut out).unwrap()
    }

    #[test]
    fn test_install_adds_entry_and_keeps_other_keys() {
        let mut settings = serde_json::json!({ "env": { "KEY": "value" } });
        let outcome = apply_install(&mut settings, "/usr/local/bin/statusline --width 38");
        assert_eq!(outcome, InstallOutcome::Added);
        assert_eq!(settings["statusLine"]["type"], "command");
        assert_eq!(
            settings["statusLine"]["command"],
            "/usr/local/bin/statusline --width 38"
        );
        assert_eq!(settings["env"]["KEY"], "value");
    }

    #[test]
    fn test_install_updates_own_entry() {
        let mut settings = serde_json::json!({
            "statusLine": { "type": "command", "command": "/old/statusline --width 25" }
        });
        let outcome = apply_install(&mut settings, "/new/statusline --width 50");
        assert_eq!(outcome, InstallOutcome::Updated);
        assert_eq!(settings["statusLine"]["command"], "/new/statusline --width 50");
    }

    #[test]
    fn test_install_reports_foreign_replacement() {
        let mut settings = serde_json::json!({
            "statusLine": { "type": "command", "command": "~/.claude/other.sh" }
        });
        assert!(has_foreign_entry(&settings));
        assert_eq!(
            apply_install(&mut settings, "statusline --width 50"),
            InstallOutcome::Replaced
        );
        assert!(!has_foreign_entry(&settings));
    }

    #[test]
    fn test_install_on_non_object_starts_fresh() {
        let mut settings = serde_json::json!([1, 2, 3]);
        apply_install(&mut settings, "statusline --width 50");
        assert!(settings.is_object());
        assert_eq!(settings["statusLine"]["type"], "command");
    }

    #[test]
    fn test_uninstall_removes_only_own_entry() {
        let mut ours = serde_json::json!({
            "model": "opus",
            "statusLine": { "type": "command", "command": "\"/Program Files/statusline\" --width 50" }
        });
        assert!(apply_uninstall(&mut ours));
        assert!(ours.get("statusLine").is_none());
        assert_eq!(ours["model"], "opus");

        let mut foreign = serde_json::json!({
            "statusLine": { "type": "command", "command": "node statusline.cjs" }
        });
        assert!(!apply_uninstall(&mut foreign));
        assert!(foreign.get("statusLine").is_some());

        let mut empty = serde_json::json!({});
        assert!(!apply_uninstall(&mut empty));
    }

    #[test]
    fn test_program_of() {
        assert_eq!(program_of("/bin/statusline --width 50"), Some("/bin/statusline"));
        assert_eq!(
            program_of("\"/my dir/statusline\" --width 50"),
            Some("/my dir/statusline")
        );
        assert_eq!(program_of("   "), None);
    }

    #[test]
    fn test_statusline_command_quotes_spaces() {
        assert_eq!(
            statusline_command(Path::new("/usr/bin/statusline"), 38),
            "/usr/bin/statusline --width 38"
        );
        assert_eq!(
            statusline_command(Path::new("/my tools/statusline"), 50),
            "\"/my tools/statusline\" --width 50"
        );
    }

    #[test]
    fn test_prompt_location() {
        let mut out = Vec::new();
        let scope = prompt_location(&mut Cursor::new(b"2\n".to_vec()), &mut out).unwrap();
        assert_eq!(scope, Some(Scope::Local));

        let scope = prompt_location(&mut Cursor::new(b"\n".to_vec()), &mut out).unwrap();
        assert_eq!(scope, Some(Scope::Global));

        let scope = prompt_location(&mut Cursor::new(Vec::new()), &mut out).unwrap();
        assert_eq!(scope, None);
    }

    #[test]
    fn test_prompt_width_presets() {
        assert_eq!(prompt_width_with("1\n"), Some(25));
        assert_eq!(prompt_width_with("2\n"), Some(38));
        assert_eq!(prompt_width_with("\n"), Some(50));
        assert_eq!(prompt_width_with("9\n"), Some(50));
    }

    #[test]
    fn test_prompt_width_custom() {
        assert_eq!(prompt_width_with("4\n72\n"), Some(72));
        assert_eq!(prompt_width_with("4\n200\n"), Some(50));
        assert_eq!(prompt_width_with("4\nabc\n"), Some(50));
        assert_eq!(prompt_width_with("4\n"), None);
        assert_eq!(prompt_width_with(""), None);
    }

    #[test]
    fn test_prompt_width_reports_invalid_custom_number() {
        let mut out = Vec::new();
        let width = prompt_width(&mut Cursor::new(b"4\nabc\n".to_vec()), &mut out).unwrap();
        assert_eq!(width, Some(50));
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Invalid number, using default (50)"));
    }

    #[test]
    fn test_prompt_width_propagates_write_errors() {
        // Accepts the prompts, fails on the invalid-number notice.
        struct RejectNotice;
        impl Write for RejectNotice {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if String::from_utf8_lossy(buf).contains("Invalid") {
                    return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
                }
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let result = prompt_width(&mut Cursor::new(b"4\nabc\n".to_vec()), &mut RejectNotice);
        assert!(result.is_err());
    }

    #[test]
    fn test_confirm_replace() {
        let mut out = Vec::new();
        assert!(confirm_replace(&mut Cursor::new(b"y\n".to_vec()), &mut out).unwrap());
        assert!(confirm_replace(&mut Cursor::new(b"YES\n".to_vec()), &mut out).unwrap());
        assert!(!confirm_replace(&mut Cursor::new(b"\n".to_vec()), &mut out).unwrap());
        assert!(!confirm_replace(&mut Cursor::new(Vec::new()), &mut out).unwrap());
    }

    #[test]
    fn test_settings_roundtrip_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut settings = read_settings(&path);
        assert_eq!(settings, serde_json::json!({}));

        apply_install(&mut settings, "statusline --width 25");
        write_settings(&path, &settings).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("}\n"));
        assert_eq!(read_settings(&path)["statusLine"]["command"], "statusline --width 25");
    }
}
