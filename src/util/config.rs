//! Configuration support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.mpi4py-build/config.toml` - User-wide defaults
//! - Project: `.mpi4py-build/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and the process
//! environment (captured once in [`BuildEnv`]) takes precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::interpreter::{CompatPolicy, PythonVersion};

/// Selects the build backend.
pub const BACKEND_ENV: &str = "MPI4PY_BUILD_BACKEND";

/// Local version label appended to the public version.
pub const LOCAL_VERSION_ENV: &str = "MPI4PY_LOCAL_VERSION";

/// Python interpreter to build for.
pub const PYTHON_ENV: &str = "PYTHON";

/// Backend used when nothing selects one.
pub const DEFAULT_BACKEND: &str = "default";

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR: &str = ".mpi4py-build";

/// Configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Interpreter compatibility thresholds
    pub policy: PolicyConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Backend selector (default, setuptools, distutils, scikit-build, skbuild)
    pub backend: Option<String>,

    /// Local version label
    pub local_version: Option<String>,

    /// Python interpreter name or path
    pub python: Option<String>,

    /// Packaging toolchain (basic, enhanced, auto)
    pub toolchain: Option<String>,
}

/// Overrides for [`CompatPolicy`]; unset fields keep the built-in value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub require_python: Option<PythonVersion>,
    pub maxknown_python: Option<PythonVersion>,
    pub package_data_min_python: Option<PythonVersion>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.backend.is_some() {
            self.build.backend = other.build.backend;
        }
        if other.build.local_version.is_some() {
            self.build.local_version = other.build.local_version;
        }
        if other.build.python.is_some() {
            self.build.python = other.build.python;
        }
        if other.build.toolchain.is_some() {
            self.build.toolchain = other.build.toolchain;
        }

        if other.policy.require_python.is_some() {
            self.policy.require_python = other.policy.require_python;
        }
        if other.policy.maxknown_python.is_some() {
            self.policy.maxknown_python = other.policy.maxknown_python;
        }
        if other.policy.package_data_min_python.is_some() {
            self.policy.package_data_min_python = other.policy.package_data_min_python;
        }
    }

    /// Apply environment values on top of the file configuration.
    pub fn apply_env(&mut self, env: &BuildEnv) {
        if env.backend.is_some() {
            self.build.backend = env.backend.clone();
        }
        if env.local_version.is_some() {
            self.build.local_version = env.local_version.clone();
        }
        if env.python.is_some() {
            self.build.python = env.python.clone();
        }
    }

    /// The backend selector, falling back to `default`.
    pub fn backend(&self) -> &str {
        self.build.backend.as_deref().unwrap_or(DEFAULT_BACKEND)
    }

    /// The compatibility policy with configured overrides applied.
    pub fn policy(&self) -> CompatPolicy {
        let defaults = CompatPolicy::default();
        CompatPolicy {
            require_python: self.policy.require_python.unwrap_or(defaults.require_python),
            maxknown_python: self.policy.maxknown_python.unwrap_or(defaults.maxknown_python),
            package_data_min_python: self
                .policy
                .package_data_min_python
                .unwrap_or(defaults.package_data_min_python),
        }
    }
}

/// Snapshot of the environment variables this tool reads.
///
/// Taken once at the process boundary so everything downstream is driven
/// by explicit values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    pub backend: Option<String>,
    pub local_version: Option<String>,
    pub python: Option<String>,
}

impl BuildEnv {
    /// Read the current process environment.
    pub fn from_process() -> Self {
        BuildEnv {
            backend: std::env::var(BACKEND_ENV).ok(),
            local_version: std::env::var(LOCAL_VERSION_ENV).ok(),
            python: std::env::var(PYTHON_ENV).ok().filter(|p| !p.is_empty()),
        }
    }
}

/// Get the global config directory (~/.mpi4py-build).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.mpi4py-build/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.mpi4py-build/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.mpi4py-build/config.toml)
/// 2. Global config (~/.mpi4py-build/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
