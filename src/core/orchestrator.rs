//! Post-generation orchestration.
//!
//! The orchestrator validates the request, resolves the run mode, and then
//! walks a fixed sequence of phases:
//!
//! ```text
//! EnvironmentSetup -> RepositoryInit -> HookInstall -> ValidationCommit
//!     -> RemotePush -> IdeLaunch -> Done
//! ```
//!
//! Every phase but the last is mandatory: the first failing command aborts
//! the run. Repository, hook, commit and push phases only run in standalone
//! mode; in integration mode their steps are recorded as skipped. The IDE
//! launch is best-effort and can only add warnings.

use crate::config::Config;
use crate::core::error::{Error, Result};
use crate::core::executor::{CommandRunner, CommandSpec};
use crate::core::ide::{self, IdeOption, Platform};
use crate::core::mode::{Mode, ModeReason, ModeResolver};
use crate::core::validate;
use serde::Serialize;
use std::path::PathBuf;

/// Recorded-name prefix for the IDE launch step.
pub const OPEN_IDE_STEP_PREFIX: &str = "open_ide";

/// Step names, in execution order.
pub mod steps {
    /// Install project dependencies.
    pub const INSTALL_DEPENDENCIES: &str = "install_dependencies";
    /// Dry run of the generated test suite.
    pub const RUN_TESTS: &str = "run_tests";
    /// Create the hosted remote repository.
    pub const CREATE_REMOTE_REPOSITORY: &str = "create_remote_repository";
    /// Initialize the local repository.
    pub const INIT_REPOSITORY: &str = "init_repository";
    /// Register the remote.
    pub const ADD_REMOTE: &str = "add_remote";
    /// Rename the initial branch.
    pub const SET_DEFAULT_BRANCH: &str = "set_default_branch";
    /// Install commit hooks into the new repository.
    pub const INSTALL_COMMIT_HOOKS: &str = "install_commit_hooks";
    /// Stage every generated file.
    pub const STAGE_FILES: &str = "stage_files";
    /// Create the validation commit.
    pub const COMMIT: &str = "commit";
    /// Push the commit to the remote.
    pub const PUSH: &str = "push";
}

/// Orchestration phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Dependency install and dry test run.
    EnvironmentSetup,
    /// Remote creation, local init, remote registration, branch naming.
    RepositoryInit,
    /// Commit hook installation.
    HookInstall,
    /// Stage and commit generated files.
    ValidationCommit,
    /// Push the validation commit.
    RemotePush,
    /// Best-effort IDE launch.
    IdeLaunch,
}

impl Phase {
    /// Returns whether this phase executes in `mode`.
    #[must_use]
    pub const fn runs_in(&self, mode: Mode) -> bool {
        match self {
            Self::EnvironmentSetup | Self::IdeLaunch => true,
            Self::RepositoryInit | Self::HookInstall | Self::ValidationCommit | Self::RemotePush => {
                mode.is_standalone()
            },
        }
    }

    /// Returns the phase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EnvironmentSetup => "environment setup",
            Self::RepositoryInit => "repository init",
            Self::HookInstall => "hook install",
            Self::ValidationCommit => "validation commit",
            Self::RemotePush => "remote push",
            Self::IdeLaunch => "IDE launch",
        }
    }
}

/// One mandatory external command in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    /// Name recorded in the run result.
    pub name: &'static str,
    /// Phase the step belongs to; decides which modes run it.
    pub phase: Phase,
    /// Command to execute.
    pub command: CommandSpec,
}

impl CommandStep {
    fn new(name: &'static str, phase: Phase, command: CommandSpec) -> Self {
        Self {
            name,
            phase,
            command,
        }
    }
}

/// Inputs handed over by the templating step.
#[derive(Debug, Clone)]
pub struct HookRequest {
    /// Name chosen for the generated project directory.
    pub directory_name: String,
    /// Raw kata name the default directory name is derived from.
    pub default_base_name: String,
    /// Requested IDE: `none`, `vscode` or `pycharm`.
    pub ide_option: String,
    /// The generated project directory; detection starts here.
    pub project_dir: PathBuf,
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    /// True unless a validation or mandatory step failed.
    pub success: bool,
    /// Process exit code matching `success` and the error.
    pub exit_code: i32,
    /// Resolved mode; unset when validation failed.
    pub mode: Option<Mode>,
    /// Why the mode was chosen.
    pub mode_reason: Option<String>,
    /// The generated project directory; unset when validation failed.
    pub generated_directory: Option<PathBuf>,
    /// Steps that ran to completion, in order.
    pub executed: Vec<String>,
    /// Steps not run because of the mode.
    pub skipped: Vec<String>,
    /// Non-fatal problems.
    pub warnings: Vec<String>,
    /// Step whose command failed, if any.
    pub failed_step: Option<String>,
    /// Error message for a failed run.
    pub error: Option<String>,
}

impl RunResult {
    fn rejected(err: &Error) -> Self {
        Self {
            success: false,
            exit_code: err.exit_code(),
            error: Some(err.to_string()),
            ..Self::default()
        }
    }

    fn fail(&mut self, step: Option<&str>, err: &Error) {
        self.success = false;
        self.exit_code = err.exit_code();
        self.failed_step = step.map(str::to_string);
        self.error = Some(err.to_string());
    }

    /// Returns the number of executed steps.
    #[must_use]
    pub fn executed_count(&self) -> usize {
        self.executed.len()
    }

    /// Returns true if `step` was executed.
    #[must_use]
    pub fn was_executed(&self, step: &str) -> bool {
        self.executed.iter().any(|s| s == step)
    }

    /// Returns true if `step` was skipped.
    #[must_use]
    pub fn was_skipped(&self, step: &str) -> bool {
        self.skipped.iter().any(|s| s == step)
    }
}

/// Sequences the post-generation steps against a [`CommandRunner`].
#[derive(Debug)]
pub struct Orchestrator<R> {
    runner: R,
    config: Config,
    platform: Platform,
    resolver: ModeResolver,
}

impl<R: CommandRunner> Orchestrator<R> {
    /// Creates an orchestrator for the current platform.
    #[must_use]
    pub fn new(runner: R, config: Config) -> Self {
        Self {
            runner,
            config,
            platform: Platform::current(),
            resolver: ModeResolver::new(),
        }
    }

    /// Overrides the platform used for IDE lookup.
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Runs the hook for `request`.
    ///
    /// Never returns an error: failures are reported through the result's
    /// `success`, `exit_code` and `error` fields.
    pub async fn run(&self, request: &HookRequest) -> RunResult {
        if let Err(err) = validate_request(request) {
            tracing::error!(error = %err, "Rejected hook input");
            return RunResult::rejected(&err);
        }

        let resolution = self.resolver.resolve(
            &request.directory_name,
            &request.default_base_name,
            &request.project_dir,
        );
        tracing::info!(mode = %resolution.mode, reason = %resolution.reason, "Resolved run mode");

        let mut result = RunResult {
            success: true,
            exit_code: 0,
            mode: Some(resolution.mode),
            mode_reason: Some(resolution.reason.to_string()),
            generated_directory: Some(request.project_dir.clone()),
            ..RunResult::default()
        };

        if let ModeReason::InsideRepository(ref root) = resolution.reason {
            tracing::info!(
                root = %root.display(),
                "Leaving hook installation and commits to the enclosing repository"
            );
        }

        let plan = match self.plan(request) {
            Ok(plan) => plan,
            Err(err) => {
                result.fail(None, &err);
                return result;
            },
        };

        if let Err((step, err)) = self.run_plan(&plan, resolution.mode, request, &mut result).await {
            tracing::error!(step, error = %err, "Mandatory step failed, aborting");
            result.fail(Some(step), &err);
            return result;
        }

        self.launch_ide(request, &mut result).await;

        tracing::info!(
            executed = result.executed.len(),
            skipped = result.skipped.len(),
            warnings = result.warnings.len(),
            "Hook finished"
        );
        result
    }

    /// Builds the mandatory step sequence for `request`.
    pub fn plan(&self, request: &HookRequest) -> Result<Vec<CommandStep>> {
        let remote = &self.config.remote;
        let name = &request.directory_name;
        let branch = &remote.default_branch;

        Ok(vec![
            CommandStep::new(
                steps::INSTALL_DEPENDENCIES,
                Phase::EnvironmentSetup,
                required(self.config.environment.install_command(), "environment.install")?,
            ),
            CommandStep::new(
                steps::RUN_TESTS,
                Phase::EnvironmentSetup,
                required(self.config.environment.test_command(), "environment.test")?,
            ),
            CommandStep::new(
                steps::CREATE_REMOTE_REPOSITORY,
                Phase::RepositoryInit,
                CommandSpec::new("gh")
                    .args(["repo", "create"])
                    .arg(remote.slug(name))
                    .arg(format!("--{}", remote.visibility)),
            ),
            CommandStep::new(
                steps::INIT_REPOSITORY,
                Phase::RepositoryInit,
                CommandSpec::new("git").arg("init"),
            ),
            CommandStep::new(
                steps::ADD_REMOTE,
                Phase::RepositoryInit,
                CommandSpec::new("git")
                    .args(["remote", "add", "origin"])
                    .arg(remote.ssh_url(name)),
            ),
            CommandStep::new(
                steps::SET_DEFAULT_BRANCH,
                Phase::RepositoryInit,
                CommandSpec::new("git").args(["branch", "-M"]).arg(branch.clone()),
            ),
            CommandStep::new(
                steps::INSTALL_COMMIT_HOOKS,
                Phase::HookInstall,
                required(self.config.hooks.install_command(), "hooks.install")?,
            ),
            CommandStep::new(
                steps::STAGE_FILES,
                Phase::ValidationCommit,
                CommandSpec::new("git").args(["add", "."]),
            ),
            CommandStep::new(
                steps::COMMIT,
                Phase::ValidationCommit,
                CommandSpec::new("git")
                    .args(["commit", "-m"])
                    .arg(commit_message(&request.default_base_name)),
            ),
            CommandStep::new(
                steps::PUSH,
                Phase::RemotePush,
                CommandSpec::new("git")
                    .args(["push", "-u", "origin"])
                    .arg(branch.clone()),
            ),
        ])
    }

    async fn run_plan(
        &self,
        plan: &[CommandStep],
        mode: Mode,
        request: &HookRequest,
        result: &mut RunResult,
    ) -> std::result::Result<(), (&'static str, Error)> {
        let limit = self.config.timeouts.command_timeout();

        for step in plan {
            if !step.phase.runs_in(mode) {
                tracing::info!(step = step.name, phase = step.phase.name(), %mode, "Skipping step");
                result.skipped.push(step.name.to_string());
                continue;
            }

            tracing::info!(step = step.name, command = %step.command, "Running step");
            self.runner
                .run(&step.command, &request.project_dir, limit)
                .await
                .map_err(|err| (step.name, err))?;
            result.executed.push(step.name.to_string());
        }

        Ok(())
    }

    async fn launch_ide(&self, request: &HookRequest, result: &mut RunResult) {
        let id = request.ide_option.as_str();
        if id == IdeOption::None.name() {
            return;
        }

        let Some(capability) = ide::capability_for(id, &request.project_dir, self.platform) else {
            warn(result, format!("Unknown IDE option: {id}"));
            return;
        };

        let Some(launcher) = capability
            .launchers
            .iter()
            .find(|launcher| launcher.is_available(&self.runner))
        else {
            warn(
                result,
                format!("{} command not found, skipping IDE open", capability.display_name),
            );
            return;
        };

        let limit = self.config.timeouts.ide_timeout();
        match self
            .runner
            .run(&launcher.command, &request.project_dir, limit)
            .await
        {
            Ok(()) => result.executed.push(format!("{OPEN_IDE_STEP_PREFIX}:{id}")),
            Err(Error::CommandTimedOut { timeout, .. }) => warn(
                result,
                format!(
                    "{} did not return within {timeout}, continuing without it",
                    capability.display_name
                ),
            ),
            Err(err) => warn(
                result,
                format!("Could not open {}: {err}", capability.display_name),
            ),
        }
    }
}

fn validate_request(request: &HookRequest) -> Result<()> {
    ide::validate_ide_option(&request.ide_option)?;
    validate::validate_directory_name(&request.directory_name)?;
    if !request.project_dir.is_absolute() {
        return Err(Error::RelativeProjectDir {
            path: request.project_dir.clone(),
        });
    }
    Ok(())
}

fn warn(result: &mut RunResult, message: String) {
    tracing::warn!("{message}");
    result.warnings.push(message);
}

fn required(command: Option<CommandSpec>, field: &str) -> Result<CommandSpec> {
    command.ok_or_else(|| Error::ConfigInvalid {
        field: field.to_string(),
        message: "Command must not be empty".to_string(),
    })
}

/// Message of the first commit in a standalone project.
#[must_use]
pub fn commit_message(kata_name: &str) -> String {
    format!("Scaffold {} kata", kata_name.trim())
}
