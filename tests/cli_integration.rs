//! CLI integration tests for mpi4py-build.
//!
//! Every run pins the interpreter version and toolchain so no Python
//! installation is needed, and points HOME at a scratch directory so a
//! user-wide config cannot leak in.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Create a project tree with a version file.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let pkg = tmp.path().join("src/mpi4py");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("__init__.py"), "\"\"\"MPI for Python.\"\"\"\n\n__version__ = '3.1.0'\n").unwrap();
    tmp
}

/// Get the mpi4py-build command for a project, with a clean environment.
fn mpi4py_build(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mpi4py-build").unwrap();
    cmd.current_dir(root)
        .env("HOME", root.join("home"))
        .env_remove("MPI4PY_BUILD_BACKEND")
        .env_remove("MPI4PY_LOCAL_VERSION")
        .env_remove("PYTHON")
        .args(["--python-version", "3.11", "--toolchain", "enhanced"]);
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// mpi4py-build version
// ============================================================================

#[test]
fn test_version_reads_init_file() {
    let tmp = project();

    mpi4py_build(tmp.path())
        .arg("version")
        .assert()
        .success()
        .stdout("3.1.0\n");
}

#[test]
fn test_version_appends_local_label() {
    let tmp = project();

    mpi4py_build(tmp.path())
        .env("MPI4PY_LOCAL_VERSION", "site1")
        .arg("version")
        .assert()
        .success()
        .stdout("3.1.0+site1\n");
}

#[test]
fn test_version_base_override() {
    let tmp = project();

    mpi4py_build(tmp.path())
        .args(["version", "--base-version", "4.0.0.dev0"])
        .assert()
        .success()
        .stdout("4.0.0.dev0\n");
}

#[test]
fn test_version_missing_file_fails() {
    let tmp = TempDir::new().unwrap();

    mpi4py_build(tmp.path())
        .arg("version")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read version file"));
}

// ============================================================================
// mpi4py-build setup
// ============================================================================

#[test]
fn test_setup_dry_run_default_backend() {
    let tmp = project();

    let call = stdout_json(mpi4py_build(tmp.path()).args(["setup", "--dry-run"]));

    assert_eq!(call["backend"], "legacy");
    assert_eq!(call["entry_point"], "mpidistutils.setup");
    assert_eq!(call["args"]["name"], "mpi4py");
    assert_eq!(call["args"]["version"], "3.1.0");
    assert_eq!(call["args"]["zip_safe"], false);
    assert_eq!(call["args"]["package_dir"][""], "src");
    assert_eq!(call["args"]["ext_modules"][0]["name"], "mpi4py.MPI");
}

#[test]
fn test_setup_backend_from_env_is_normalized() {
    let tmp = project();

    let call = stdout_json(
        mpi4py_build(tmp.path())
            .env("MPI4PY_BUILD_BACKEND", "Scikit_Build")
            .args(["setup", "--dry-run"]),
    );

    assert_eq!(call["backend"], "cmake");
    assert_eq!(call["entry_point"], "skbuild.setup");
    assert_eq!(call["args"]["cmake_source_dir"], "src/mpi4py");
    assert!(call["args"].get("ext_modules").is_none());
}

#[test]
fn test_setup_unknown_backend_fails() {
    let tmp = project();

    mpi4py_build(tmp.path())
        .args(["setup", "--dry-run", "--backend", "bogus"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Unknown build backend 'bogus'"));
}

#[test]
fn test_setup_rejects_old_python() {
    let tmp = project();

    mpi4py_build(tmp.path())
        .args(["--python-version", "3.5", "setup", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires Python version >=3.6"));
}

#[test]
fn test_setup_writes_out_file() {
    let tmp = project();
    let out = tmp.path().join("build/setup.json");

    mpi4py_build(tmp.path())
        .args(["setup", "--out"])
        .arg(&out)
        .assert()
        .success();

    let call: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(call["backend"], "legacy");
}

#[test]
fn test_project_config_selects_backend() {
    let tmp = project();
    let config_dir = tmp.path().join(".mpi4py-build");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[build]\nbackend = \"skbuild\"\n").unwrap();

    let call = stdout_json(mpi4py_build(tmp.path()).args(["setup", "--dry-run"]));
    assert_eq!(call["backend"], "cmake");

    // environment beats the project file
    let call = stdout_json(
        mpi4py_build(tmp.path())
            .env("MPI4PY_BUILD_BACKEND", "setuptools")
            .args(["setup", "--dry-run"]),
    );
    assert_eq!(call["backend"], "legacy");
}

// ============================================================================
// inspection commands
// ============================================================================

#[test]
fn test_metadata_basic_toolchain_has_no_extended_fields() {
    let tmp = project();

    let record = stdout_json(mpi4py_build(tmp.path()).args(["metadata", "--toolchain", "basic"]));
    assert_eq!(record["name"], "mpi4py");
    assert!(record.get("python_requires").is_none());
    assert!(record.get("project_urls").is_none());
}

#[test]
fn test_metadata_extended() {
    let tmp = project();

    let record = stdout_json(
        mpi4py_build(tmp.path()).args(["metadata", "--toolchain", "basic", "--extended"]),
    );
    assert_eq!(record["python_requires"], ">=3.6");
    assert!(record["project_urls"].is_object());
}

#[test]
fn test_layout_trims_data_for_old_python() {
    let tmp = project();

    let layout = stdout_json(mpi4py_build(tmp.path()).arg("layout"));
    assert_eq!(layout["package_data"]["mpi4py"].as_array().unwrap().len(), 8);

    let layout = stdout_json(mpi4py_build(tmp.path()).args(["--python-version", "3.6", "layout"]));
    assert_eq!(layout["package_data"]["mpi4py"].as_array().unwrap().len(), 5);
}

#[test]
fn test_artifacts() {
    let tmp = project();

    let artifacts = stdout_json(mpi4py_build(tmp.path()).arg("artifacts"));
    assert_eq!(artifacts["extensions"].as_array().unwrap().len(), 1);
    assert_eq!(artifacts["executables"].as_array().unwrap().len(), 1);
    assert_eq!(artifacts["sources"].as_array().unwrap().len(), 1);
}

#[test]
fn test_backends_lists_selectors() {
    let tmp = project();

    mpi4py_build(tmp.path())
        .env("MPI4PY_BUILD_BACKEND", "skbuild")
        .arg("backends")
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy"))
        .stdout(predicate::str::contains("cmake").and(predicate::str::contains("(selected)")))
        .stdout(predicate::str::contains("scikit-build, skbuild"));
}

#[test]
fn test_completions() {
    let tmp = project();

    mpi4py_build(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mpi4py-build"));
}

#[test]
fn test_invalid_toolchain_fails() {
    let tmp = project();

    mpi4py_build(tmp.path())
        .args(["metadata", "--toolchain", "poetry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("poetry"));
}
