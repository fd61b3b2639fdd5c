//! # kata-hook
//!
//! Post-generation hook for a kata project template.
//!
//! After the template engine has rendered a new project directory, the hook
//! decides how to wire it into version control. A default-named project
//! outside any repository runs in *standalone* mode: dependencies are
//! installed, a remote repository is created, commit hooks are installed and
//! a first commit is pushed. A project that was given an explicit name, or
//! that lives inside an existing repository, runs in *integration* mode and
//! leaves repository creation, hooks and commits to the enclosing checkout.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kata_hook::{Config, HookRequest, Orchestrator, ProcessRunner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let project_dir = std::env::current_dir().expect("cwd");
//!     let config = Config::load_or_default(&project_dir).expect("config");
//!
//!     let request = HookRequest {
//!         directory_name: "20260108_bowling".to_string(),
//!         default_base_name: "Bowling".to_string(),
//!         ide_option: "vscode".to_string(),
//!         project_dir,
//!     };
//!
//!     let orchestrator = Orchestrator::new(ProcessRunner::new(), config);
//!     let result = orchestrator.run(&request).await;
//!
//!     if !result.success {
//!         std::process::exit(result.exit_code);
//!     }
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/kata-hook/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cli;
pub mod config;
pub mod core;

// Re-export main types for convenience
pub use config::Config;
pub use core::error::{Error, Result};
pub use core::executor::{CommandRunner, CommandSpec, Executor, ProcessRunner};
pub use core::git::{is_inside_repository, RepositoryDetector};
pub use core::ide::IdeOption;
pub use core::mode::{resolve_mode, Mode, ModeResolver};
pub use core::orchestrator::{HookRequest, Orchestrator, RunResult};
