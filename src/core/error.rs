//! Error types for kata-hook.
//!
//! Errors fall into three families: validation errors raised before any
//! external command runs, fatal command errors raised by mandatory steps,
//! and tool-unavailability which the orchestrator downgrades to warnings.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in kata-hook.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Validation errors
    // =========================================================================
    /// IDE option outside the supported set.
    #[error("Invalid open_ide value: '{value}'. Valid options: none, pycharm, vscode.{}", suggestion_suffix(.suggestion.as_deref()))]
    InvalidIdeOption {
        /// The rejected value.
        value: String,
        /// Closest valid option, if one is near enough.
        suggestion: Option<String>,
    },

    /// Directory name that cannot be used as a single path component.
    #[error("Invalid directory name '{name}'. {reason}")]
    InvalidDirectoryName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Target directory is already present.
    #[error("Directory '{name}' already exists. Remove or rename it first.")]
    DirectoryExists {
        /// Name of the existing directory.
        name: String,
    },

    /// Kata name is not a valid module identifier.
    #[error("The kata name ({name}) is not a valid Python module name. Please do not use a - and use _ instead")]
    InvalidKataName {
        /// The rejected kata name.
        name: String,
    },

    /// Project directory given as a relative path.
    #[error("Project directory must be an absolute path, got '{}'", .path.display())]
    RelativeProjectDir {
        /// The rejected path.
        path: PathBuf,
    },

    /// A required name was empty.
    #[error("{field} must not be empty")]
    EmptyName {
        /// Which input was empty.
        field: String,
    },

    // =========================================================================
    // Command errors
    // =========================================================================
    /// External command exited with a non-zero status.
    #[error("Command '{command}' failed with exit code {exit_code}{}", stderr_suffix(.stderr))]
    CommandFailed {
        /// The command line that failed.
        command: String,
        /// Exit status reported by the process.
        exit_code: i32,
        /// Tail of captured standard error, if any.
        stderr: String,
    },

    /// External command exceeded its timeout.
    #[error("Command '{command}' timed out after {timeout}")]
    CommandTimedOut {
        /// The command line that timed out.
        command: String,
        /// Timeout duration as string.
        timeout: String,
    },

    /// Command not found.
    #[error("Command not found: {command}")]
    CommandNotFound {
        /// The command that wasn't found.
        command: String,
    },

    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path where config was expected.
        path: PathBuf,
    },

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        /// Description of the parse error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    ConfigInvalid {
        /// Field name that is invalid.
        field: String,
        /// Description of why it's invalid.
        message: String,
    },

    // =========================================================================
    // I/O errors
    // =========================================================================
    /// File I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Internal error (should never happen).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

fn suggestion_suffix(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(" Did you mean '{s}'?"))
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl Error {
    /// Creates a new configuration parse error.
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new configuration parse error with source.
    pub fn config_parse_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new I/O error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Creates a new command failed error.
    pub fn command_failed(
        command: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a new invalid directory name error.
    pub fn invalid_directory_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDirectoryName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error was raised before any command ran.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdeOption { .. }
                | Self::InvalidDirectoryName { .. }
                | Self::DirectoryExists { .. }
                | Self::InvalidKataName { .. }
                | Self::RelativeProjectDir { .. }
                | Self::EmptyName { .. }
        )
    }

    /// Returns true if this is a user-correctable error.
    pub const fn is_user_error(&self) -> bool {
        self.is_validation()
            || matches!(
                self,
                Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. } | Self::CommandNotFound { .. }
            )
    }

    /// Returns an exit code appropriate for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed { exit_code, .. } if *exit_code != 0 => *exit_code,
            Self::CommandTimedOut { .. } => 124, // Standard timeout exit code
            Self::CommandNotFound { .. } => 127,
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                78
            }, // EX_CONFIG
            e if e.is_validation() => 2,
            _ => 1,
        }
    }
}
