//! Package version resolution.
//!
//! The public version comes from a [`VersionSource`]; an optional local
//! version label (from `MPI4PY_LOCAL_VERSION`) is appended as `+label`.
//! The result is computed once per resolver and cached.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use regex::Regex;

/// Location of the version declaration, relative to the project root.
pub const VERSION_FILE: &str = "src/mpi4py/__init__.py";

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^__version__\s*=\s*['"]([^'"]+)['"]"#).expect("valid version regex")
});

/// Computes the public (base) version of the package.
pub trait VersionSource {
    fn version(&self) -> Result<String>;
}

/// Reads `__version__` from the package's `__init__.py`.
#[derive(Debug, Clone)]
pub struct FileVersionSource {
    path: PathBuf,
}

impl FileVersionSource {
    /// Source reading the version file under `project_root`.
    pub fn new(project_root: &Path) -> Self {
        FileVersionSource {
            path: project_root.join(VERSION_FILE),
        }
    }

    /// Source reading an explicit file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        FileVersionSource { path: path.into() }
    }
}

impl VersionSource for FileVersionSource {
    fn version(&self) -> Result<String> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read version file: {}", self.path.display()))?;

        VERSION_RE
            .captures(&contents)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| anyhow!("no __version__ found in {}", self.path.display()))
    }
}

/// A fixed version, used for `--base-version` and in tests.
#[derive(Debug, Clone)]
pub struct StaticVersionSource(pub String);

impl VersionSource for StaticVersionSource {
    fn version(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Memoizing version resolver.
pub struct VersionResolver {
    source: Box<dyn VersionSource>,
    local_version: Option<String>,
    cache: OnceCell<String>,
}

impl VersionResolver {
    /// Create a resolver over a version source.
    pub fn new(source: Box<dyn VersionSource>) -> Self {
        VersionResolver {
            source,
            local_version: None,
            cache: OnceCell::new(),
        }
    }

    /// Set the local version label. Empty labels are ignored at resolve time.
    pub fn with_local_version(mut self, local_version: Option<String>) -> Self {
        self.local_version = local_version;
        self
    }

    /// Resolve the full version string.
    ///
    /// The source is consulted on the first successful call only.
    pub fn resolve(&self) -> Result<&str> {
        if self.cache.get().is_none() {
            let public = self.source.version()?;
            let version = match self.local_version.as_deref() {
                Some(local) if !local.is_empty() => format!("{}+{}", public, local),
                _ => public,
            };
            tracing::debug!("Resolved version {}", version);
            let _ = self.cache.set(version);
        }

        Ok(self.cache.get().map(String::as_str).unwrap_or_default())
    }

    /// Drop the cached version so the next call recomputes it.
    pub fn reset(&mut self) {
        self.cache.take();
    }
}

/// The public part of a version string (everything before `+`).
pub fn public_version(version: &str) -> &str {
    version.split_once('+').map_or(version, |(public, _)| public)
}
