//! Core functionality for kata-hook.
//!
//! This module contains the main components:
//! - [`git`]: Repository detection by upward traversal
//! - [`mode`]: Standalone vs integration mode resolution
//! - [`executor`]: External command execution with timeouts
//! - [`ide`]: IDE option validation and launcher lookup
//! - [`validate`]: Input validation run before any command
//! - [`orchestrator`]: The post-generation step sequence
//! - [`error`]: Error types and result handling

pub mod error;
pub mod executor;
pub mod git;
pub mod ide;
pub mod mode;
pub mod orchestrator;
pub mod validate;
