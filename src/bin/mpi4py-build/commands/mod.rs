//! Command implementations

pub mod artifacts;
pub mod backends;
pub mod completions;
pub mod layout;
pub mod metadata;
pub mod setup;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context, Result};

use mpi4py_build::core::metadata::long_description;
use mpi4py_build::core::version::StaticVersionSource;
use mpi4py_build::core::{PythonVersion, ToolchainPreference};
use mpi4py_build::util::config::{global_config_path, load_config, project_config_path};
use mpi4py_build::util::process::{detect_python_version, find_python, python_has_module};
use mpi4py_build::util::BuildEnv;
use mpi4py_build::{Dispatcher, Settings};

use crate::cli::GlobalArgs;

/// Everything a command needs after flags, environment, and config files
/// have been folded together.
pub struct BuildContext {
    pub python: Option<PathBuf>,
    pub dispatcher: Dispatcher,
}

/// Resolve settings and construct the dispatcher.
///
/// Precedence is command line, then environment, then project config, then
/// global config.
pub fn build_context(
    global: &GlobalArgs,
    env: &BuildEnv,
    backend: Option<&str>,
) -> Result<BuildContext> {
    let root = &global.root;

    let global_path = global_config_path();
    let mut config = load_config(global_path.as_deref(), &project_config_path(root));
    config.apply_env(env);

    if let Some(backend) = backend {
        config.build.backend = Some(backend.to_string());
    }
    if let Some(ref python) = global.python {
        config.build.python = Some(python.clone());
    }
    if let Some(ref toolchain) = global.toolchain {
        config.build.toolchain = Some(toolchain.clone());
    }

    // An explicit version means the interpreter is optional
    let (python, python_version) = match global.python_version {
        Some(ref raw) => {
            let version: PythonVersion = raw.parse()?;
            (find_python(config.build.python.as_deref()).ok(), version)
        }
        None => {
            let path = find_python(config.build.python.as_deref())?;
            let version = detect_python_version(&path)?;
            (Some(path), version)
        }
    };
    tracing::debug!("Building for Python {}", python_version);

    let toolchain: ToolchainPreference = match config.build.toolchain {
        Some(ref raw) => raw.parse()?,
        None => ToolchainPreference::default(),
    };

    let long_description = match long_description(root) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!("No long description: {:#}", e);
            None
        }
    };

    let settings = Settings::new(root, python_version)
        .with_backend(config.backend())
        .with_policy(config.policy())
        .with_toolchain(toolchain)
        .with_local_version(config.build.local_version.clone())
        .with_long_description(long_description);

    let mut dispatcher = Dispatcher::new(settings);

    if let Some(ref version) = global.base_version {
        dispatcher = dispatcher.with_version_source(Box::new(StaticVersionSource(version.clone())));
    }

    if let Some(ref path) = python {
        let path = path.clone();
        dispatcher = dispatcher.with_toolchain_probe(move || python_has_module(&path, "setuptools"));
    }

    Ok(BuildContext {
        python,
        dispatcher,
    })
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
