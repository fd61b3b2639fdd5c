//! Integration tests for the kata-hook CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn kata_hook() -> Command {
    let mut cmd = Command::cargo_bin("kata-hook").expect("binary built");
    cmd.env_remove("KATA_NAME")
        .env_remove("KATA_DIRECTORY_NAME")
        .env_remove("KATA_OPEN_IDE")
        .env_remove("RUST_LOG")
        .arg("--color")
        .arg("never");
    cmd
}

/// Creates `name` under a fresh temp dir and returns both.
fn project_in_temp(name: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("create temp dir");
    let project = temp.path().join(name);
    std::fs::create_dir(&project).expect("create project dir");
    (temp, project)
}

fn today_directory_name(base: &str) -> String {
    kata_hook::core::mode::default_directory_name(base, chrono::Local::now().date_naive())
}

fn temp_is_clean(path: &Path) -> bool {
    let clean = !kata_hook::is_inside_repository(path);
    if !clean {
        eprintln!("skipping: temp dir {} is inside a repository", path.display());
    }
    clean
}

#[test]
fn test_help() {
    kata_hook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Post-generation hook"));
}

#[test]
fn test_version() {
    kata_hook()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_subcommand_fails() {
    kata_hook().assert().failure();
}

// =============================================================================
// pre-gen
// =============================================================================

#[test]
fn test_pre_gen_accepts_valid_names() {
    let temp = TempDir::new().expect("create temp dir");

    kata_hook()
        .args(["pre-gen", "--kata-name", "my_kata", "--directory-name", "20260108_my_kata"])
        .arg("--parent-dir")
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("can be generated"));
}

#[test]
fn test_pre_gen_rejects_dashed_kata_name() {
    let temp = TempDir::new().expect("create temp dir");

    kata_hook()
        .args(["pre-gen", "--kata-name", "my-kata", "--directory-name", "kata"])
        .arg("--parent-dir")
        .arg(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a valid Python module name"));
}

#[test]
fn test_pre_gen_rejects_path_separator() {
    let temp = TempDir::new().expect("create temp dir");

    kata_hook()
        .args(["pre-gen", "--kata-name", "my_kata", "--directory-name", "a/b"])
        .arg("--parent-dir")
        .arg(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Path separators not allowed"));
}

#[test]
fn test_pre_gen_rejects_existing_directory() {
    let temp = TempDir::new().expect("create temp dir");
    std::fs::create_dir(temp.path().join("taken")).expect("create dir");

    kata_hook()
        .args(["pre-gen", "--kata-name", "my_kata", "--directory-name", "taken"])
        .arg("--parent-dir")
        .arg(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

// =============================================================================
// detect
// =============================================================================

#[test]
fn test_detect_custom_name_is_integration() {
    let (_temp, project) = project_in_temp("trading-engine");

    kata_hook()
        .args(["detect", "--kata-name", "My Kata"])
        .arg("--project-dir")
        .arg(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("integration"))
        .stderr(predicate::str::contains("does not follow"));
}

#[test]
fn test_detect_inside_repository_is_integration() {
    let temp = TempDir::new().expect("create temp dir");
    std::fs::create_dir(temp.path().join(".git")).expect("create marker");
    let name = today_directory_name("My Kata");
    let project = temp.path().join(&name);
    std::fs::create_dir(&project).expect("create project dir");

    kata_hook()
        .args(["detect", "--kata-name", "My Kata", "--json"])
        .arg("--project-dir")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\":\"integration\""))
        .stdout(predicate::str::contains("Inside existing repository"));
}

#[test]
fn test_detect_default_name_outside_repository_is_standalone() {
    let name = today_directory_name("My Kata");
    let (temp, project) = project_in_temp(&name);
    if !temp_is_clean(temp.path()) {
        return;
    }

    kata_hook()
        .args(["detect", "--kata-name", "My Kata", "--json"])
        .arg("--project-dir")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\":\"standalone\""));
}

#[test]
fn test_detect_explicit_directory_name_overrides_path() {
    let name = today_directory_name("My Kata");
    let (_temp, project) = project_in_temp(&name);

    kata_hook()
        .args(["d", "-k", "My Kata", "-d", "trading-engine", "--json"])
        .arg("--project-dir")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"directory_name\":\"trading-engine\""))
        .stdout(predicate::str::contains("\"mode\":\"integration\""));
}

// =============================================================================
// post-gen
// =============================================================================

#[test]
fn test_post_gen_rejects_misspelled_ide() {
    let (temp, project) = project_in_temp("trading-engine");
    let config = temp.path().join("kata-hook.toml");
    std::fs::write(&config, "").expect("write config");

    kata_hook()
        .args(["post-gen", "--kata-name", "My Kata", "--open-ide", "vcode"])
        .arg("--project-dir")
        .arg(&project)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid open_ide value: 'vcode'"))
        .stderr(predicate::str::contains("Did you mean 'vscode'?"));
}

#[test]
fn test_post_gen_json_reports_rejection() {
    let (temp, project) = project_in_temp("trading-engine");
    let config = temp.path().join("kata-hook.toml");
    std::fs::write(&config, "").expect("write config");

    kata_hook()
        .args(["post-gen", "-k", "My Kata", "-d", "a/b", "--json"])
        .arg("--project-dir")
        .arg(&project)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"success\": false"))
        .stdout(predicate::str::contains("\"generated_directory\": null"));
}

#[test]
fn test_post_gen_rejects_invalid_config() {
    let (temp, project) = project_in_temp("trading-engine");
    let config = temp.path().join("kata-hook.toml");
    std::fs::write(&config, "[timeouts]\ncommand = \"whenever\"\n").expect("write config");

    kata_hook()
        .args(["post-gen", "-k", "My Kata"])
        .arg("--project-dir")
        .arg(&project)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(78)
        .stderr(predicate::str::contains("timeouts.command"));
}

// =============================================================================
// config / completions
// =============================================================================

#[test]
fn test_config_default_prints_toml() {
    kata_hook()
        .args(["config", "--default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[remote]"))
        .stdout(predicate::str::contains("default_branch = \"main\""));
}

#[test]
fn test_completions_bash() {
    kata_hook()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kata-hook"));
}

/// Writes an executable shell script named `name` into `bin`.
#[cfg(unix)]
fn fake_program(bin: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = bin.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("make script executable");
}

#[cfg(unix)]
#[test]
fn test_post_gen_relative_project_dir_opens_ide_on_absolute_path() {
    let temp = TempDir::new().expect("create temp dir");
    let project = temp.path().join("kata");
    std::fs::create_dir(&project).expect("create project dir");
    let bin = temp.path().join("bin");
    std::fs::create_dir(&bin).expect("create bin dir");
    let log = temp.path().join("code.log");
    let config = temp.path().join("kata-hook.toml");
    std::fs::write(&config, "").expect("write config");

    fake_program(&bin, "pipenv", "exit 0");
    fake_program(&bin, "code", &format!("cd \"$1\" && pwd -P > '{}'", log.display()));

    let path = std::env::var_os("PATH").unwrap_or_default();
    let mut paths = vec![bin.clone()];
    paths.extend(std::env::split_paths(&path));
    let path = std::env::join_paths(paths).expect("join PATH");

    let output = kata_hook()
        .current_dir(temp.path())
        .env("PATH", path)
        .args(["post-gen", "-k", "My Kata", "-d", "trading-engine", "--json"])
        .args(["--project-dir", "kata", "--open-ide", "vscode"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("open_ide:vscode"))
        .get_output()
        .stdout
        .clone();

    let result: serde_json::Value = serde_json::from_slice(&output).expect("json result");
    let generated = result["generated_directory"].as_str().expect("generated directory");
    assert!(Path::new(generated).is_absolute(), "{generated} is not absolute");
    assert_eq!(
        Path::new(generated).canonicalize().expect("canonicalize generated"),
        project.canonicalize().expect("canonicalize project")
    );

    let opened = std::fs::read_to_string(&log).expect("IDE was handed a reachable path");
    assert_eq!(
        Path::new(opened.trim()),
        project.canonicalize().expect("canonicalize project")
    );
}
