//! Configuration handling for kata-hook.
//!
//! This module provides configuration loading and validation,
//! supporting `kata-hook.toml` files and sensible defaults that match the
//! kata template (pipenv environment, GitHub remote).

use crate::core::error::{Error, Result};
use crate::core::executor::CommandSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "kata-hook.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Environment setup commands.
    pub environment: EnvironmentConfig,
    /// Commit hook installation.
    pub hooks: HooksConfig,
    /// Remote repository settings.
    pub remote: RemoteConfig,
    /// Command timeouts.
    pub timeouts: TimeoutConfig,
}

impl Config {
    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read config", e))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads configuration found from `start`, or returns defaults.
    pub fn load_or_default(start: &Path) -> Result<Self> {
        match Self::find_config_file(start) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "Loading configuration");
                Self::load_from(&path)
            },
            Err(Error::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Finds the configuration file by searching up from `start`, then in
    /// the user configuration directory.
    pub fn find_config_file(start: &Path) -> Result<PathBuf> {
        let mut current = start;
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Ok(config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.is_file() {
                return Ok(user_path);
            }
        }

        Err(Error::ConfigNotFound {
            path: start.join(CONFIG_FILE_NAME),
        })
    }

    /// Returns the per-user configuration path, if the platform has one.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kata-hook").join("config.toml"))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("timeouts.command", &self.timeouts.command),
            ("timeouts.ide", &self.timeouts.ide),
        ] {
            if humantime::parse_duration(value).is_err() {
                return Err(Error::ConfigInvalid {
                    field: field.to_string(),
                    message: format!("Invalid duration: {value}"),
                });
            }
        }

        for (field, argv) in [
            ("environment.install", &self.environment.install),
            ("environment.test", &self.environment.test),
            ("hooks.install", &self.hooks.install),
        ] {
            if argv.first().map_or(true, |program| program.trim().is_empty()) {
                return Err(Error::ConfigInvalid {
                    field: field.to_string(),
                    message: "Command must not be empty".to_string(),
                });
            }
        }

        if !matches!(self.remote.visibility.as_str(), "private" | "public" | "internal") {
            return Err(Error::ConfigInvalid {
                field: "remote.visibility".to_string(),
                message: format!(
                    "Expected private, public or internal, got '{}'",
                    self.remote.visibility
                ),
            });
        }

        for (field, value) in [
            ("remote.owner", &self.remote.owner),
            ("remote.host", &self.remote.host),
            ("remote.default_branch", &self.remote.default_branch),
        ] {
            if value.trim().is_empty() {
                return Err(Error::ConfigInvalid {
                    field: field.to_string(),
                    message: "Must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Generates default configuration as a string.
    #[must_use]
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Environment setup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Dependency installation command.
    pub install: Vec<String>,
    /// Dry test-cycle command.
    pub test: Vec<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            install: argv(&["pipenv", "install", "--dev"]),
            test: argv(&["pipenv", "run", "tests"]),
        }
    }
}

impl EnvironmentConfig {
    /// Returns the install command.
    #[must_use]
    pub fn install_command(&self) -> Option<CommandSpec> {
        CommandSpec::from_argv(&self.install)
    }

    /// Returns the test command.
    #[must_use]
    pub fn test_command(&self) -> Option<CommandSpec> {
        CommandSpec::from_argv(&self.test)
    }
}

/// Commit hook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// Command installing the generated project's commit hooks.
    pub install: Vec<String>,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            install: argv(&["pipenv", "run", "install_pre_hooks"]),
        }
    }
}

impl HooksConfig {
    /// Returns the hook install command.
    #[must_use]
    pub fn install_command(&self) -> Option<CommandSpec> {
        CommandSpec::from_argv(&self.install)
    }
}

/// Remote repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Account or organization owning the remote repository.
    pub owner: String,
    /// Repository visibility passed to `gh repo create`.
    pub visibility: String,
    /// Branch the first commit is pushed to.
    pub default_branch: String,
    /// Git host used for the SSH remote URL.
    pub host: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            owner: "undeadgrishnackh".to_string(),
            visibility: "private".to_string(),
            default_branch: "main".to_string(),
            host: "github.com".to_string(),
        }
    }
}

impl RemoteConfig {
    /// Returns `<owner>/<name>`.
    #[must_use]
    pub fn slug(&self, name: &str) -> String {
        format!("{}/{name}", self.owner)
    }

    /// Returns the SSH URL for repository `name`.
    #[must_use]
    pub fn ssh_url(&self, name: &str) -> String {
        format!("git@{}:{}.git", self.host, self.slug(name))
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Ceiling for setup, install, test and git commands.
    pub command: String,
    /// Ceiling for the best-effort IDE launch.
    pub ide: String,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            command: "6m".to_string(),
            ide: "10s".to_string(),
        }
    }
}

impl TimeoutConfig {
    /// Parsed command timeout. Falls back to 6 minutes if unparsable.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        parse_duration(&self.command, Duration::from_secs(360))
    }

    /// Parsed IDE timeout. Falls back to 10 seconds if unparsable.
    #[must_use]
    pub fn ide_timeout(&self) -> Duration {
        parse_duration(&self.ide, Duration::from_secs(10))
    }
}

fn parse_duration(s: &str, fallback: Duration) -> Duration {
    humantime::parse_duration(s).unwrap_or_else(|_| {
        tracing::warn!(timeout_str = %s, fallback = ?fallback, "Invalid timeout format, using default");
        fallback
    })
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}
