//! Subprocess execution and interpreter discovery.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use anyhow::{anyhow, bail, Context, Result};

use crate::core::interpreter::PythonVersion;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command with captured output.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd.output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))
    }

    /// Execute with inherited stdio and return the status.
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();
        cmd.status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find a Python interpreter.
///
/// An explicit path or name wins; otherwise `python3` then `python` are
/// looked up in PATH.
pub fn find_python(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(name) = explicit {
        return find_executable(name)
            .ok_or_else(|| anyhow!("Python interpreter `{}` not found", name));
    }

    ["python3", "python"]
        .iter()
        .find_map(|name| find_executable(name))
        .ok_or_else(|| anyhow!("no Python interpreter found in PATH (set PYTHON or use --python)"))
}

/// Ask an interpreter for its version.
pub fn detect_python_version(python: &Path) -> Result<PythonVersion> {
    let output = ProcessBuilder::new(python).arg("--version").exec()?;
    if !output.status.success() {
        bail!("`{} --version` failed", python.display());
    }

    // Python 2 printed its version on stderr
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    PythonVersion::from_version_output(&stdout)
        .or_else(|| PythonVersion::from_version_output(&stderr))
        .ok_or_else(|| anyhow!("could not parse Python version from: {}", stdout.trim()))
}

/// Whether `import <module>` succeeds in the interpreter.
pub fn python_has_module(python: &Path, module: &str) -> bool {
    ProcessBuilder::new(python)
        .arg("-c")
        .arg(format!("import {}", module))
        .exec()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("python3").args(["-c", "import setuptools"]);
        assert_eq!(pb.display_command(), "python3 -c import setuptools");
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_captures_output() {
        let output = ProcessBuilder::new("echo").arg("hello").exec().unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    }

    #[test]
    fn test_missing_explicit_python() {
        let err = find_python(Some("definitely-not-a-python-xyz")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
