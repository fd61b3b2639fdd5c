//! CLI command implementations.

use super::NamingArgs;
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::core::error::{Error, Result};
use crate::core::executor::ProcessRunner;
use crate::core::mode::{Mode, ModeResolver};
use crate::core::orchestrator::{HookRequest, Orchestrator, RunResult};
use crate::core::validate;
use console::style;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Run the post-generation hook.
pub async fn post_gen(
    naming: &NamingArgs,
    open_ide: &str,
    config_path: Option<&Path>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode> {
    let project_dir = project_dir(naming.project_dir.as_deref())?;
    let config = match config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(&project_dir)?,
    };

    let request = HookRequest {
        directory_name: directory_name(naming, &project_dir),
        default_base_name: naming.kata_name.clone(),
        ide_option: open_ide.to_string(),
        project_dir,
    };

    let runner = ProcessRunner::new().with_progress(!json && !quiet);
    let result = Orchestrator::new(runner, config).run(&request).await;

    if json {
        let rendered = serde_json::to_string_pretty(&result).map_err(|e| Error::Internal {
            message: format!("Failed to serialize result: {e}"),
        })?;
        println!("{rendered}");
    } else if !quiet || !result.success {
        print_summary(&result);
    }

    Ok(exit_code(result.exit_code))
}

/// Validate names before the template is rendered.
pub fn pre_gen(kata_name: &str, directory_name: &str, parent_dir: Option<&Path>) -> Result<ExitCode> {
    let parent = project_dir(parent_dir)?;
    validate::validate_pre_generation(kata_name, directory_name, &parent)?;

    eprintln!(
        "{} '{}' can be generated in {}",
        style("✓").green(),
        directory_name,
        parent.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Show the resolved mode and reasoning.
pub fn detect(naming: &NamingArgs, json: bool) -> Result<ExitCode> {
    let project_dir = project_dir(naming.project_dir.as_deref())?;
    let directory_name = directory_name(naming, &project_dir);
    let resolution = ModeResolver::new().resolve(&directory_name, &naming.kata_name, &project_dir);

    if json {
        let value = serde_json::json!({
            "mode": resolution.mode,
            "reason": resolution.reason.to_string(),
            "directory_name": directory_name,
            "project_dir": project_dir,
        });
        println!("{value}");
        return Ok(ExitCode::SUCCESS);
    }

    let mode_styled = match resolution.mode {
        Mode::Standalone => style(resolution.mode.name()).green().bold(),
        Mode::Integration => style(resolution.mode.name()).yellow().bold(),
    };

    eprintln!("Mode: {mode_styled}");
    eprintln!("Reason: {}", resolution.reason);

    Ok(ExitCode::SUCCESS)
}

/// Show configuration.
pub fn config(default: bool) -> Result<ExitCode> {
    if default {
        println!("{}", Config::default_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let cwd = project_dir(None)?;
    match Config::find_config_file(&cwd) {
        Ok(path) => {
            eprintln!("Config file: {}", style(path.display()).cyan());
            let content =
                std::fs::read_to_string(&path).map_err(|e| Error::io("read config", e))?;
            println!("{content}");
        },
        Err(Error::ConfigNotFound { .. }) => {
            eprintln!(
                "{} No {CONFIG_FILE_NAME} found, using defaults:",
                style("•").cyan()
            );
            println!("{}", Config::default_toml());
        },
        Err(e) => return Err(e),
    }

    Ok(ExitCode::SUCCESS)
}

/// Generate shell completions.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    let mut cmd = super::Cli::command();
    clap_complete::generate(shell, &mut cmd, "kata-hook", &mut std::io::stdout());
}

/// Returns `explicit` made absolute against the current directory, or the
/// current directory itself.
fn project_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
        Some(path) => Ok(current_dir()?.join(path)),
        None => current_dir(),
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| Error::io("get current dir", e))
}

fn directory_name(naming: &NamingArgs, project_dir: &Path) -> String {
    naming.directory_name.clone().unwrap_or_else(|| {
        project_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    })
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(exit_status(code))
}

/// Maps a result code onto a process status byte; out-of-range failures become 1.
fn exit_status(code: i32) -> u8 {
    if code == 0 {
        return 0;
    }
    u8::try_from(code).ok().filter(|status| *status != 0).unwrap_or(1)
}

fn print_summary(result: &RunResult) {
    eprintln!();

    if let (Some(mode), Some(reason)) = (result.mode, result.mode_reason.as_deref()) {
        eprintln!("{} {} mode ({reason})", style("•").cyan(), style(mode).bold());
    }

    for step in &result.skipped {
        eprintln!("{} {} (skipped)", style("○").dim(), style(step).dim());
    }

    for warning in &result.warnings {
        eprintln!("{} {warning}", style("!").yellow());
    }

    if let Some(ref error) = result.error {
        match result.failed_step {
            Some(ref step) => eprintln!("{} {step}: {error}", style("✗").red().bold()),
            None => eprintln!("{} {error}", style("✗").red().bold()),
        }
        return;
    }

    eprintln!(
        "{} {} steps run, {} skipped",
        style("✓").green().bold(),
        result.executed_count(),
        result.skipped.len()
    );

    if result.mode == Some(Mode::Integration) && !result.skipped.is_empty() {
        eprintln!("  Review the generated files, then stage and commit them yourself.");
    }
}
