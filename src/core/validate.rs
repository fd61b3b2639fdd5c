//! Input validation that runs before any external command.

use crate::core::error::{Error, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Pattern a kata name must match to be importable as a module.
const MODULE_PATTERN: &str = r"^[_a-zA-Z][_a-zA-Z0-9]+$";

/// Rejects empty names and names that are not a single path component.
pub fn validate_directory_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::EmptyName {
            field: "directory_name".to_string(),
        });
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::invalid_directory_name(
            name,
            "Path separators not allowed.",
        ));
    }

    if name == "." || name == ".." {
        return Err(Error::invalid_directory_name(
            name,
            "Relative directory references not allowed.",
        ));
    }

    Ok(())
}

/// Rejects a target directory that already exists under `parent`.
pub fn ensure_target_absent(name: &str, parent: &Path) -> Result<()> {
    if parent.join(name).exists() {
        return Err(Error::DirectoryExists {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Rejects kata names that are not valid module identifiers.
pub fn validate_kata_name(name: &str) -> Result<()> {
    let valid = module_pattern().is_some_and(|re| re.is_match(name));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidKataName {
            name: name.to_string(),
        })
    }
}

/// Full pre-generation check: kata name, directory name, then target.
pub fn validate_pre_generation(kata_name: &str, directory_name: &str, parent: &Path) -> Result<()> {
    validate_kata_name(kata_name)?;
    validate_directory_name(directory_name)?;
    ensure_target_absent(directory_name, parent)
}

fn module_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(MODULE_PATTERN).ok()).as_ref()
}
