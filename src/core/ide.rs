//! IDE option validation and launcher lookup.
//!
//! The option string is validated up front and rejected with a suggestion.
//! Launching is a capability lookup: each identifier maps to a set of
//! candidate launchers, each with an availability probe and a command. No
//! usable candidate means a warning, never an error.

use crate::core::error::{Error, Result};
use crate::core::executor::{CommandRunner, CommandSpec};
use std::path::Path;

/// Location of the PyCharm application bundle on macOS.
const PYCHARM_APP_BUNDLE: &str = "/Applications/PyCharm.app";

/// Maximum edit distance for a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Supported values for the `open_ide` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdeOption {
    /// Do not open anything.
    #[default]
    None,
    /// Visual Studio Code.
    VsCode,
    /// JetBrains PyCharm.
    PyCharm,
}

impl IdeOption {
    /// All options, sorted by name.
    pub const ALL: [Self; 3] = [Self::None, Self::PyCharm, Self::VsCode];

    /// Returns the option's identifier.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::VsCode => "vscode",
            Self::PyCharm => "pycharm",
        }
    }
}

impl std::fmt::Display for IdeOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for IdeOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|option| option.name() == s)
            .ok_or_else(|| Error::InvalidIdeOption {
                value: s.to_string(),
                suggestion: suggest(s).map(|o| o.name().to_string()),
            })
    }
}

/// Validates an `open_ide` value.
pub fn validate_ide_option(value: &str) -> Result<IdeOption> {
    value.parse()
}

/// Returns the option the user most likely meant.
#[must_use]
pub fn suggest(value: &str) -> Option<IdeOption> {
    let lowered = value.trim().to_lowercase();

    match lowered.as_str() {
        "code" | "vs-code" | "vs code" | "visualstudiocode" => return Some(IdeOption::VsCode),
        "charm" | "jetbrains" | "py-charm" => return Some(IdeOption::PyCharm),
        _ => {},
    }

    IdeOption::ALL
        .into_iter()
        .map(|option| (option, edit_distance(&lowered, option.name())))
        .filter(|(_, distance)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(_, distance)| *distance)
        .map(|(option, _)| option)
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Target desktop platform, which changes how some IDEs are launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// macOS, where application bundles are opened with `open -a`.
    MacOs,
    /// Everything else.
    Other,
}

impl Platform {
    /// Returns the platform this binary was built for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }
}

/// How to check whether a launcher can be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// A program must be on PATH.
    OnPath(&'static str),
    /// A file or bundle must exist.
    PathExists(&'static str),
}

/// One way of opening a project in an IDE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    /// Probe deciding whether this launcher can run.
    pub availability: Availability,
    /// Command that opens the project.
    pub command: CommandSpec,
}

impl Launcher {
    /// Returns true if the probe passes.
    pub fn is_available(&self, runner: &impl CommandRunner) -> bool {
        match self.availability {
            Availability::OnPath(program) => runner.command_exists(program),
            Availability::PathExists(path) => runner.path_exists(Path::new(path)),
        }
    }
}

/// Capability entry for one IDE identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeCapability {
    /// Display name used in warnings.
    pub display_name: &'static str,
    /// Candidate launchers, in preference order.
    pub launchers: Vec<Launcher>,
}

/// Looks up how to open `project_dir` with the IDE named `id`.
///
/// Returns `None` for identifiers with no known launcher, including `none`.
#[must_use]
pub fn capability_for(id: &str, project_dir: &Path, platform: Platform) -> Option<IdeCapability> {
    let dir = project_dir.display().to_string();

    match id {
        "vscode" => Some(IdeCapability {
            display_name: "VS Code 'code'",
            launchers: vec![Launcher {
                availability: Availability::OnPath("code"),
                command: CommandSpec::new("code").arg(dir),
            }],
        }),
        "pycharm" => {
            let mut launchers = vec![Launcher {
                availability: Availability::OnPath("pycharm"),
                command: CommandSpec::new("pycharm").arg(dir.clone()),
            }];
            if platform == Platform::MacOs {
                launchers.push(Launcher {
                    availability: Availability::PathExists(PYCHARM_APP_BUNDLE),
                    command: CommandSpec::new("open").args(["-a", "PyCharm"]).arg(dir),
                });
            }
            Some(IdeCapability {
                display_name: "PyCharm",
                launchers,
            })
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[rstest]
    #[case("none", IdeOption::None)]
    #[case("vscode", IdeOption::VsCode)]
    #[case("pycharm", IdeOption::PyCharm)]
    fn test_valid_options(#[case] value: &str, #[case] expected: IdeOption) {
        assert_eq!(validate_ide_option(value).expect("valid"), expected);
    }

    #[test]
    fn test_typo_suggests_vscode() {
        let err = validate_ide_option("vcode").expect_err("should fail");
        assert!(matches!(&err, Error::InvalidIdeOption { value, suggestion }
            if value == "vcode" && suggestion.as_deref() == Some("vscode")
        ));
        assert!(err.to_string().contains("'vcode'"));
        assert!(err.to_string().contains("Did you mean 'vscode'?"));
    }

    #[rstest]
    #[case("code", Some(IdeOption::VsCode))]
    #[case("jetbrains", Some(IdeOption::PyCharm))]
    #[case("charm", Some(IdeOption::PyCharm))]
    #[case("pycharn", Some(IdeOption::PyCharm))]
    #[case("VSCode", Some(IdeOption::VsCode))]
    #[case("nne", Some(IdeOption::None))]
    #[case("emacs", None)]
    fn test_suggest(#[case] value: &str, #[case] expected: Option<IdeOption>) {
        assert_eq!(suggest(value), expected);
    }

    #[test]
    fn test_option_matching_is_case_sensitive() {
        assert!(validate_ide_option("VSCode").is_err());
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("vcode", "vscode"), 1);
        assert_eq!(edit_distance("", "none"), 4);
        assert_eq!(edit_distance("pycharm", "pycharm"), 0);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    // =========================================================================
    // Capability lookup tests
    // =========================================================================

    #[test]
    fn test_vscode_capability() {
        let cap = capability_for("vscode", Path::new("/tmp/kata"), Platform::Other)
            .expect("vscode is known");
        assert_eq!(cap.launchers.len(), 1);
        assert_eq!(cap.launchers[0].availability, Availability::OnPath("code"));
        assert_eq!(cap.launchers[0].command.to_string(), "code /tmp/kata");
    }

    #[test]
    fn test_pycharm_capability_on_macos_adds_bundle() {
        let cap = capability_for("pycharm", Path::new("/tmp/kata"), Platform::MacOs)
            .expect("pycharm is known");
        assert_eq!(cap.launchers.len(), 2);
        assert_eq!(
            cap.launchers[1].availability,
            Availability::PathExists(PYCHARM_APP_BUNDLE)
        );
        assert_eq!(
            cap.launchers[1].command.to_string(),
            "open -a PyCharm /tmp/kata"
        );
    }

    #[test]
    fn test_pycharm_capability_elsewhere_is_cli_only() {
        let cap = capability_for("pycharm", Path::new("/tmp/kata"), Platform::Other)
            .expect("pycharm is known");
        assert_eq!(cap.launchers.len(), 1);
    }

    #[test]
    fn test_unknown_and_none_have_no_capability() {
        assert!(capability_for("none", Path::new("/tmp"), Platform::Other).is_none());
        assert!(capability_for("sublime", Path::new("/tmp"), Platform::Other).is_none());
    }
}
