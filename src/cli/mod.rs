//! Command-line interface for kata-hook.
//!
//! This module provides the `kata-hook` CLI with subcommands for:
//! - `post-gen`: Run the post-generation hook
//! - `pre-gen`: Validate names before generation
//! - `detect`: Show the resolved mode and reasoning
//! - `config`: Show configuration file location and contents
//! - `completions`: Generate shell completions

mod commands;

use crate::core::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Post-generation hook for kata project templates.
#[derive(Debug, Parser)]
#[command(
    name = "kata-hook",
    author,
    version,
    about = "Post-generation hook for kata project templates",
    long_about = r#"
kata-hook wires a freshly generated kata project into git and tooling.

Standalone mode (default-named project, no enclosing repository):
  installs dependencies, runs the tests, creates the remote repository,
  installs commit hooks, commits and pushes.

Integration mode (explicit directory name, or inside an existing repository):
  installs dependencies and runs the tests only. Stage and commit manually.

Quick start:
  kata-hook pre-gen --kata-name my_kata --directory-name 20260108_my_kata
  kata-hook post-gen --kata-name "My Kata" --open-ide vscode
"#,
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use color output.
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Naming inputs shared by several subcommands.
#[derive(Debug, Clone, Args)]
pub struct NamingArgs {
    /// Raw kata name the default directory name is derived from.
    #[arg(short, long, env = "KATA_NAME")]
    pub kata_name: String,

    /// Generated directory name. Defaults to the project directory's name.
    #[arg(short, long, env = "KATA_DIRECTORY_NAME")]
    pub directory_name: Option<String>,

    /// Generated project directory. Defaults to the current directory.
    #[arg(short, long)]
    pub project_dir: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the post-generation hook in the generated project.
    #[command(visible_alias = "run")]
    PostGen {
        #[command(flatten)]
        naming: NamingArgs,

        /// IDE to open afterwards: none, vscode or pycharm.
        #[arg(long, default_value = "none", env = "KATA_OPEN_IDE")]
        open_ide: String,

        /// Configuration file to use instead of searching for one.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the run result as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Validate the kata and directory names before generation.
    PreGen {
        /// Kata name; must be a valid module identifier.
        #[arg(short, long, env = "KATA_NAME")]
        kata_name: String,

        /// Directory that is about to be generated.
        #[arg(short, long, env = "KATA_DIRECTORY_NAME")]
        directory_name: String,

        /// Directory the project will be generated in. Defaults to the current directory.
        #[arg(long)]
        parent_dir: Option<PathBuf>,
    },

    /// Show the resolved mode and reasoning.
    #[command(visible_alias = "d")]
    Detect {
        #[command(flatten)]
        naming: NamingArgs,

        /// Print the resolution as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Show configuration file location and contents.
    Config {
        /// Print the built-in defaults instead.
        #[arg(long)]
        default: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Runs the CLI.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);
    setup_color(cli.color);

    match cli.command {
        Commands::PostGen {
            naming,
            open_ide,
            config,
            json,
        } => commands::post_gen(&naming, &open_ide, config.as_deref(), json, cli.quiet).await,
        Commands::PreGen {
            kata_name,
            directory_name,
            parent_dir,
        } => commands::pre_gen(&kata_name, &directory_name, parent_dir.as_deref()),
        Commands::Detect { naming, json } => commands::detect(&naming, json),
        Commands::Config { default } => commands::config(default),
        Commands::Completions { shell } => {
            commands::completions(shell);
            Ok(ExitCode::SUCCESS)
        },
    }
}

/// Sets up logging based on verbosity flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {
            // Let console crate auto-detect
        },
    }
}
