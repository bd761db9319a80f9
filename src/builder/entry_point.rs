//! Setup entry points - where the merged configuration is finally handed off.
//!
//! `JsonEntryPoint` records the call without running anything.
//! `PythonEntryPoint` runs the backend's `setup()` in a Python interpreter.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::builder::backend::{BackendKind, BuildBackend};
use crate::builder::setup_config::SetupConfig;
use crate::util::fs::write_string;
use crate::util::process::ProcessBuilder;

/// Driver run with `python -c`. Arguments: config path, backend kind, then
/// the arguments forwarded to `setup()` as `sys.argv[1:]`.
const PYTHON_DRIVER: &str = r#"
import importlib, json, sys

def resolve(ref):
    module, _, name = ref.rpartition('.')
    return getattr(importlib.import_module(module), name)

def wrap(cls, kwargs):
    if 'configure' in kwargs:
        kwargs['configure'] = resolve(kwargs['configure'])
    if 'define_macros' in kwargs:
        kwargs['define_macros'] = [tuple(m) for m in kwargs['define_macros']]
    return cls(**kwargs)

def main():
    path, kind = sys.argv[1], sys.argv[2]
    sys.argv = ['setup.py'] + sys.argv[3:]
    with open(path) as f:
        args = json.load(f)
    sys.path.insert(0, 'conf')
    if kind == 'legacy':
        from mpidistutils import setup, Extension, Executable, build_src
        build_src.sources = args.pop('build_src', [])
        args['ext_modules'] = [wrap(Extension, kw) for kw in args.get('ext_modules', [])]
        args['executables'] = [wrap(Executable, kw) for kw in args.get('executables', [])]
    else:
        from skbuild import setup
    setup(**args)

main()
"#;

/// Receives the merged configuration for a backend.
pub trait SetupEntryPoint {
    fn setup(&self, backend: &dyn BuildBackend, args: &SetupConfig) -> Result<()>;
}

/// Serialized form of a setup call.
#[derive(Debug, Serialize)]
pub struct SetupCall<'a> {
    pub backend: BackendKind,
    pub entry_point: &'a str,
    pub args: &'a SetupConfig,
}

impl<'a> SetupCall<'a> {
    pub fn new(backend: &'a dyn BuildBackend, args: &'a SetupConfig) -> Self {
        SetupCall {
            backend: backend.kind(),
            entry_point: backend.entry_point(),
            args,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize setup call")
    }
}

/// Where a [`JsonEntryPoint`] writes.
#[derive(Debug, Clone)]
pub enum JsonOutput {
    Stdout,
    File(PathBuf),
}

/// Writes the setup call as JSON instead of running it.
#[derive(Debug, Clone)]
pub struct JsonEntryPoint {
    output: JsonOutput,
}

impl JsonEntryPoint {
    pub fn stdout() -> Self {
        JsonEntryPoint {
            output: JsonOutput::Stdout,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        JsonEntryPoint {
            output: JsonOutput::File(path.into()),
        }
    }
}

impl SetupEntryPoint for JsonEntryPoint {
    fn setup(&self, backend: &dyn BuildBackend, args: &SetupConfig) -> Result<()> {
        let json = SetupCall::new(backend, args).to_json()?;
        match &self.output {
            JsonOutput::Stdout => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", json).context("failed to write to stdout")?;
            }
            JsonOutput::File(path) => {
                write_string(path, &json)?;
                tracing::info!("Wrote setup configuration to {}", path.display());
            }
        }
        Ok(())
    }
}

/// Runs the backend's `setup()` in a Python interpreter.
#[derive(Debug, Clone)]
pub struct PythonEntryPoint {
    python: PathBuf,
    project_root: PathBuf,
    setup_argv: Vec<String>,
}

impl PythonEntryPoint {
    pub fn new(python: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        PythonEntryPoint {
            python: python.into(),
            project_root: project_root.into(),
            setup_argv: Vec::new(),
        }
    }

    /// Arguments forwarded to `setup()` (e.g. `build_ext --inplace`).
    pub fn with_setup_argv(mut self, argv: Vec<String>) -> Self {
        self.setup_argv = argv;
        self
    }

    fn command(&self, config_path: &Path, backend: BackendKind) -> ProcessBuilder {
        ProcessBuilder::new(&self.python)
            .arg("-c")
            .arg(PYTHON_DRIVER)
            .arg(config_path)
            .arg(backend.as_str())
            .args(&self.setup_argv)
            .cwd(&self.project_root)
    }
}

impl SetupEntryPoint for PythonEntryPoint {
    fn setup(&self, backend: &dyn BuildBackend, args: &SetupConfig) -> Result<()> {
        let json = serde_json::to_string(args).context("failed to serialize setup arguments")?;

        let mut file = tempfile::Builder::new()
            .prefix("mpi4py-setup-")
            .suffix(".json")
            .tempfile()
            .context("failed to create temporary setup configuration")?;
        file.write_all(json.as_bytes())
            .context("failed to write temporary setup configuration")?;
        file.flush()?;

        let cmd = self.command(file.path(), backend.kind());
        tracing::info!("Running {} with {}", backend.entry_point(), self.python.display());

        let status = cmd.status()?;
        if !status.success() {
            bail!(
                "{} failed with exit code {:?}",
                backend.entry_point(),
                status.code()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::setuptools::LegacyBackend;
    use crate::builder::skbuild::CMakeBackend;
    use tempfile::TempDir;

    #[test]
    fn test_setup_call_json() {
        let mut args = SetupConfig::new();
        args.insert("name", "mpi4py");

        let json = SetupCall::new(&CMakeBackend, &args).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["backend"], "cmake");
        assert_eq!(value["entry_point"], "skbuild.setup");
        assert_eq!(value["args"]["name"], "mpi4py");
    }

    #[test]
    fn test_json_entry_point_writes_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("setup.json");

        let mut args = SetupConfig::new();
        args.insert("zip_safe", false);
        JsonEntryPoint::file(&path).setup(&LegacyBackend, &args).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["backend"], "legacy");
        assert_eq!(value["args"]["zip_safe"], false);
    }

    #[test]
    fn test_python_command_line() {
        let entry = PythonEntryPoint::new("python3", "/src/mpi4py")
            .with_setup_argv(vec!["build_ext".to_string(), "--inplace".to_string()]);

        let cmd = entry.command(Path::new("/tmp/cfg.json"), BackendKind::Legacy);
        let line = cmd.display_command();

        assert!(line.starts_with("python3 -c"));
        assert!(line.ends_with("/tmp/cfg.json legacy build_ext --inplace"));
    }

    #[test]
    fn test_python_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let entry = PythonEntryPoint::new(tmp.path().join("no-such-python"), tmp.path());
        let err = entry.setup(&LegacyBackend, &SetupConfig::new()).unwrap_err();
        assert!(err.to_string().contains("failed to execute"));
    }
}
