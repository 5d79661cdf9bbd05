//! Git state for line 2, read through the `git` binary.
//!
//! Each sub-query is attempted once and fails on its own: a missing upstream
//! or an unreadable status leaves that field empty without discarding the
//! rest.

use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Runs a program with arguments inside a directory.
pub trait CommandRunner {
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> io::Result<Output>;
}

#[derive(Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> io::Result<Output> {
        Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
    }
}

/// Working tree summary, reduced to the glyph shown after the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGlyph {
    Clean,
    UnstagedOnly,
    StagedOnly,
    Both,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitState {
    pub is_repository: bool,
    /// Absent on a detached HEAD.
    pub branch: Option<String>,
    pub upstream: Option<String>,
    /// Only set when strictly positive.
    pub ahead: Option<u32>,
    /// Only set when strictly positive.
    pub behind: Option<u32>,
    /// Absent when `git status` itself failed.
    pub status: Option<StatusGlyph>,
}

impl GitState {
    pub fn not_a_repository() -> Self {
        Self::default()
    }
}

pub struct GitSummarizer<R: CommandRunner = ProcessCommandRunner> {
    runner: R,
}

impl Default for GitSummarizer<ProcessCommandRunner> {
    fn default() -> Self {
        Self::new(ProcessCommandRunner)
    }
}

impl<R: CommandRunner> GitSummarizer<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Summarize the repository containing `dir`. An empty directory, a
    /// missing `git`, or a directory outside any repository all yield
    /// [`GitState::not_a_repository`].
    pub fn summarize(&self, dir: &str) -> GitState {
        if dir.is_empty() {
            return GitState::not_a_repository();
        }
        let dir = Path::new(dir);

        if self.query(dir, &["rev-parse", "--git-dir"]).is_none() {
            tracing::debug!(dir = %dir.display(), "not inside a git repository");
            return GitState::not_a_repository();
        }

        let branch = self
            .query(dir, &["branch", "--show-current"])
            .map(|out| out.trim().to_string())
            .filter(|b| !b.is_empty());

        let upstream = self
            .query(
                dir,
                &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"],
            )
            .map(|out| out.trim().to_string())
            .filter(|u| !u.is_empty());

        let (ahead, behind) = match &upstream {
            Some(up) => {
                let range = format!("HEAD...{}", up);
                self.query(dir, &["rev-list", "--left-right", "--count", &range])
                    .map(|out| parse_ahead_behind(&out))
                    .unwrap_or((None, None))
            }
            None => (None, None),
        };

        let status = self
            .query(dir, &["status", "--porcelain"])
            .map(|out| classify_porcelain(&out));

        GitState {
            is_repository: true,
            branch,
            upstream,
            ahead,
            behind,
            status,
        }
    }

    /// Stdout of a successful git invocation, `None` on any failure.
    fn query(&self, dir: &Path, args: &[&str]) -> Option<String> {
        match self.runner.run(dir, "git", args) {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                tracing::debug!(
                    ?args,
                    code = ?output.status.code(),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "git query failed"
                );
                None
            }
            Err(e) => {
                tracing::debug!(?args, error = %e, "could not run git");
                None
            }
        }
    }
}

/// Parse `git rev-list --left-right --count` output ("<ahead>\t<behind>").
pub fn parse_ahead_behind(output: &str) -> (Option<u32>, Option<u32>) {
    let mut parts = output.split_whitespace();
    let mut next_positive = || {
        parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|n| *n > 0)
    };
    let ahead = next_positive();
    let behind = next_positive();
    (ahead, behind)
}

/// Reduce `git status --porcelain` lines to one glyph.
///
/// Staged: first column is one of `MADRC`. Unstaged: second column is `M`
/// or `D`, or the line is untracked (`??`).
pub fn classify_porcelain(output: &str) -> StatusGlyph {
    let mut staged = false;
    let mut unstaged = false;

    for line in output.lines().filter(|l| !l.is_empty()) {
        let mut cols = line.chars();
        let index = cols.next();
        let worktree = cols.next();

        if matches!(index, Some('M' | 'A' | 'D' | 'R' | 'C')) {
            staged = true;
        }
        if line.starts_with("??") || matches!(worktree, Some('M' | 'D')) {
            unstaged = true;
        }
    }

    match (staged, unstaged) {
        (true, true) => StatusGlyph::Both,
        (false, true) => StatusGlyph::UnstagedOnly,
        (true, false) => StatusGlyph::StagedOnly,
        (false, false) => StatusGlyph::Clean,
    }
}
