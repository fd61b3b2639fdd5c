//! Command execution for hook steps.
//!
//! This module provides utilities for executing external programs with
//! timeout support, optional output capture, and error handling, plus the
//! [`CommandRunner`] seam the orchestrator drives.

use crate::core::error::{Error, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;

/// Exit code reported for a killed, timed-out process.
const TIMEOUT_EXIT_CODE: i32 = 124;

/// Lines of stderr kept for failure messages.
const STDERR_TAIL_LINES: usize = 20;

/// A program plus its arguments. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// Program to run, looked up on PATH.
    pub program: String,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Builds a command from an argv vector; `None` when it is empty.
    #[must_use]
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Output from a command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code of the command.
    pub exit_code: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Whether the command was killed due to timeout.
    pub timed_out: bool,
    /// Duration the command took to run.
    pub duration: Duration,
}

impl CommandOutput {
    /// Returns true if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Returns the last few lines of stderr.
    #[must_use]
    pub fn stderr_tail(&self) -> String {
        let lines: Vec<&str> = self.stderr.lines().collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].join("\n")
    }
}

/// Options for command execution.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Working directory for the command.
    pub cwd: Option<PathBuf>,
    /// Timeout for the command.
    pub timeout: Option<Duration>,
    /// Whether to capture output (vs streaming to console).
    pub capture_output: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            timeout: Some(Duration::from_secs(360)),
            capture_output: true,
        }
    }
}

impl ExecuteOptions {
    /// Sets the working directory.
    #[must_use]
    pub fn cwd(mut self, path: impl AsRef<Path>) -> Self {
        self.cwd = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets whether to capture output.
    #[must_use]
    pub const fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }
}

/// Executor for running external programs.
#[derive(Debug, Default)]
pub struct Executor;

impl Executor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Executes a command, returning its output even when it fails.
    ///
    /// Only a missing program or an I/O failure while spawning is an error.
    pub async fn execute(&self, command: &CommandSpec, options: ExecuteOptions) -> Result<CommandOutput> {
        let start = std::time::Instant::now();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);

        if let Some(ref cwd) = options.cwd {
            cmd.current_dir(cwd);
        }

        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);

        if options.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CommandNotFound {
                    command: command.program.clone(),
                }
            } else {
                Error::io(format!("spawn {command}"), e)
            }
        })?;

        let result = if let Some(timeout_duration) = options.timeout {
            match timeout(timeout_duration, async {
                self.wait_for_output(&mut child, options.capture_output).await
            })
            .await
            {
                Ok(result) => result,
                Err(_) => {
                    // Kill the process on timeout - ignore result since we're returning anyway
                    drop(child.kill().await);
                    return Ok(CommandOutput {
                        exit_code: TIMEOUT_EXIT_CODE,
                        stdout: String::new(),
                        stderr: "Command timed out".to_string(),
                        timed_out: true,
                        duration: start.elapsed(),
                    });
                },
            }
        } else {
            self.wait_for_output(&mut child, options.capture_output)
                .await
        };

        let (exit_code, stdout, stderr) = result?;

        Ok(CommandOutput {
            exit_code,
            stdout,
            stderr,
            timed_out: false,
            duration: start.elapsed(),
        })
    }

    /// Waits for the command to complete and captures output.
    async fn wait_for_output(
        &self,
        child: &mut tokio::process::Child,
        capture: bool,
    ) -> Result<(i32, String, String)> {
        if !capture {
            let status = child.wait().await.map_err(|e| Error::io("wait for command", e))?;
            return Ok((status.code().unwrap_or(1), String::new(), String::new()));
        }

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let stdout_handle = tokio::spawn(async move {
            let mut output = String::new();
            if let Some(stdout) = stdout {
                let mut reader = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    output.push_str(&line);
                    output.push('\n');
                }
            }
            output
        });

        let stderr_handle = tokio::spawn(async move {
            let mut output = String::new();
            if let Some(stderr) = stderr {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    output.push_str(&line);
                    output.push('\n');
                }
            }
            output
        });

        let status = child.wait().await.map_err(|e| Error::io("wait for command", e))?;

        let stdout = stdout_handle.await.map_err(|e| Error::Internal {
            message: format!("stdout task failed: {e}"),
        })?;
        let stderr = stderr_handle.await.map_err(|e| Error::Internal {
            message: format!("stderr task failed: {e}"),
        })?;

        Ok((status.code().unwrap_or(1), stdout, stderr))
    }

    /// Checks if a command exists in PATH.
    #[must_use]
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }
}

/// Runs one external command for the orchestrator.
///
/// Implementations must not retry. A non-zero exit maps to
/// [`Error::CommandFailed`], an expired timeout to [`Error::CommandTimedOut`],
/// and a missing program to [`Error::CommandNotFound`].
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Runs `command` in `cwd`, waiting at most `limit`.
    async fn run(&self, command: &CommandSpec, cwd: &Path, limit: Duration) -> Result<()>;

    /// Returns true if `program` can be found on PATH.
    fn command_exists(&self, program: &str) -> bool;

    /// Returns true if `path` exists on disk.
    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// [`CommandRunner`] backed by real processes.
#[derive(Debug, Default)]
pub struct ProcessRunner {
    executor: Executor,
    show_progress: bool,
}

impl ProcessRunner {
    /// Creates a runner that prints nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            executor: Executor::new(),
            show_progress: false,
        }
    }

    /// Shows a spinner and a pass/fail line per command.
    #[must_use]
    pub const fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn spinner(&self, command: &CommandSpec) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .ok()
                .unwrap_or_else(ProgressStyle::default_spinner),
        );
        pb.set_message(format!("Running {command}..."));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec, cwd: &Path, limit: Duration) -> Result<()> {
        tracing::debug!(command = %command, cwd = %cwd.display(), timeout = ?limit, "Running command");

        let options = ExecuteOptions::default().cwd(cwd).timeout(limit);
        let pb = self.spinner(command);
        let output = self.executor.execute(command, options).await;
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        let output = output?;

        if self.show_progress {
            if output.success() {
                eprintln!("{} {command}", style("✓").green());
            } else if output.timed_out {
                eprintln!("{} {command} (timed out)", style("✗").red());
            } else {
                eprintln!("{} {command}", style("✗").red());
            }
        }

        if output.timed_out {
            return Err(Error::CommandTimedOut {
                command: command.to_string(),
                timeout: humantime::format_duration(limit).to_string(),
            });
        }

        if !output.success() {
            return Err(Error::command_failed(
                command.to_string(),
                output.exit_code,
                output.stderr_tail(),
            ));
        }

        tracing::debug!(command = %command, elapsed = ?output.duration, "Command finished");
        Ok(())
    }

    fn command_exists(&self, program: &str) -> bool {
        Executor::command_exists(program)
    }
}
