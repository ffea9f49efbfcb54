//! Running a final, validated command string through the system shell.
//!
//! The child inherits stdin, stdout, stderr, and the parent environment;
//! per-command overrides are layered on top. Going through a shell keeps
//! pipes and redirects working for templates that are allowed to use them.

use crate::error::{DevctlError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub trait ShellRunner {
    /// Run `command` and return its exit code.
    fn run(&self, command: &str, env: &BTreeMap<String, String>) -> Result<i32>;
}

#[derive(Debug, Clone, Default)]
pub struct SystemShell {
    cwd: Option<PathBuf>,
}

impl SystemShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run commands from `dir` instead of the current directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            cwd: Some(dir.to_path_buf()),
        }
    }
}

fn build_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

impl ShellRunner for SystemShell {
    fn run(&self, command: &str, env: &BTreeMap<String, String>) -> Result<i32> {
        let mut cmd = build_command(command);
        cmd.envs(env);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        tracing::debug!(command = %command, "spawning shell");
        let status = cmd.status().map_err(|e| DevctlError::SpawnFailed {
            command: command.to_string(),
            message: e.to_string(),
        })?;

        // Killed by a signal: report the conventional 128+N where available.
        Ok(status.code().unwrap_or_else(|| signal_exit_code(&status)))
    }
}

#[cfg(unix)]
fn signal_exit_code(status: &std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|s| 128 + s).unwrap_or(1)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: &std::process::ExitStatus) -> i32 {
    1
}
