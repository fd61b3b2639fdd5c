//! Mode resolution for standalone vs integration runs.
//!
//! A run is *standalone* when the generated project gets its own repository,
//! remote and first commit. It is *integration* when an enclosing repository
//! is assumed to own version control, in which case repository creation and
//! commit-producing steps are skipped.
//!
//! Two independent signals select integration mode: a directory name that
//! does not follow the default naming convention, or an ancestor repository.

use crate::core::git::RepositoryDetector;
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// The resolved run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// No enclosing repository: create and wire up a new one end to end.
    #[default]
    Standalone,
    /// An enclosing repository manages version control.
    Integration,
}

impl Mode {
    /// Returns a human-readable name for the mode.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Integration => "integration",
        }
    }

    /// Returns whether repository-creating steps run in this mode.
    #[must_use]
    pub const fn is_standalone(&self) -> bool {
        matches!(self, Self::Standalone)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Why a mode was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeReason {
    /// Directory name differs from the default naming convention.
    NameMismatch {
        /// The name that was supplied.
        directory_name: String,
        /// Normalized base name the convention expects after the date stamp.
        expected_suffix: String,
    },
    /// An ancestor directory holds a repository marker.
    InsideRepository(PathBuf),
    /// Default-named and no enclosing repository.
    Default,
}

impl std::fmt::Display for ModeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameMismatch {
                directory_name,
                expected_suffix,
            } => write!(
                f,
                "Directory name '{directory_name}' does not follow YYYYMMDD_{expected_suffix}"
            ),
            Self::InsideRepository(root) => {
                write!(f, "Inside existing repository at {}", root.display())
            },
            Self::Default => write!(f, "Default directory name and no enclosing repository"),
        }
    }
}

/// Result of mode resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved mode.
    pub mode: Mode,
    /// Reason for the resolution.
    pub reason: ModeReason,
}

/// Resolves the run mode from the naming signal and the repository signal.
#[derive(Debug, Default)]
pub struct ModeResolver {
    detector: RepositoryDetector,
}

impl ModeResolver {
    /// Creates a new resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            detector: RepositoryDetector::new(),
        }
    }

    /// Resolves the mode and reports which signal decided it.
    ///
    /// The name signal is checked first; the filesystem is only walked when
    /// the name alone does not force integration mode.
    #[must_use]
    pub fn resolve(&self, directory_name: &str, default_base_name: &str, start: &Path) -> Resolution {
        if !matches_default_convention(directory_name, default_base_name) {
            let resolution = Resolution {
                mode: Mode::Integration,
                reason: ModeReason::NameMismatch {
                    directory_name: directory_name.to_string(),
                    expected_suffix: normalize_base_name(default_base_name),
                },
            };
            tracing::debug!(reason = %resolution.reason, "Resolved integration mode");
            return resolution;
        }

        if let Some(root) = self.detector.find_repository_root(start) {
            let resolution = Resolution {
                mode: Mode::Integration,
                reason: ModeReason::InsideRepository(root),
            };
            tracing::debug!(reason = %resolution.reason, "Resolved integration mode");
            return resolution;
        }

        tracing::debug!("Resolved standalone mode");
        Resolution {
            mode: Mode::Standalone,
            reason: ModeReason::Default,
        }
    }

    /// Resolves the mode only.
    #[must_use]
    pub fn resolve_mode(&self, directory_name: &str, default_base_name: &str, start: &Path) -> Mode {
        self.resolve(directory_name, default_base_name, start).mode
    }
}

/// Resolves the mode with a fresh resolver.
#[must_use]
pub fn resolve_mode(directory_name: &str, default_base_name: &str, start: &Path) -> Mode {
    ModeResolver::new().resolve_mode(directory_name, default_base_name, start)
}

/// Lowercases, trims and joins whitespace-separated words with `_`.
#[must_use]
pub fn normalize_base_name(base: &str) -> String {
    base.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Renders the default directory name for `base` on `date`.
#[must_use]
pub fn default_directory_name(base: &str, date: NaiveDate) -> String {
    format!("{}_{}", date.format("%Y%m%d"), normalize_base_name(base))
}

/// Returns true if `directory_name` is `YYYYMMDD_<normalized base>`.
///
/// The stamp must be a real calendar date.
#[must_use]
pub fn matches_default_convention(directory_name: &str, default_base_name: &str) -> bool {
    let Some(captures) = date_stamp_pattern().and_then(|re| re.captures(directory_name)) else {
        return false;
    };
    let (stamp, rest) = (&captures[1], &captures[2]);

    let expected = normalize_base_name(default_base_name);
    !expected.is_empty()
        && rest == expected
        && NaiveDate::parse_from_str(stamp, "%Y%m%d").is_ok()
}

fn date_stamp_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\d{8})_(.+)$").ok())
        .as_ref()
}
