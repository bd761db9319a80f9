//! Backend dispatch.
//!
//! The dispatcher is constructed from explicit [`Settings`]; nothing below
//! this point reads the process environment. A run moves through
//! `Start -> BackendSelected -> SetupDispatched`, or ends in `Failed`.

use std::cell::Cell;
use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::builder::backend::{BackendChoice, BackendKind, BuildBackend, SetupInputs};
use crate::builder::entry_point::SetupEntryPoint;
use crate::builder::registry::BackendRegistry;
use crate::builder::setup_config::SetupConfig;
use crate::core::artifact::{build_artifacts, BuildArtifacts};
use crate::core::interpreter::{CompatPolicy, PythonVersion};
use crate::core::layout::{build_layout, PackageLayout};
use crate::core::metadata::{MetadataAssembler, MetadataRecord};
use crate::core::toolchain::{select_toolchain, PackagingToolchain, ToolchainPreference};
use crate::core::version::{FileVersionSource, VersionResolver, VersionSource};
use crate::util::config::DEFAULT_BACKEND;

/// Everything a dispatch run depends on, resolved at the process boundary.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory containing the package sources
    pub project_root: PathBuf,

    /// Raw backend selector, normalized at dispatch time
    pub backend: String,

    /// Interpreter being built for
    pub python: PythonVersion,

    /// Interpreter thresholds
    pub policy: CompatPolicy,

    /// Packaging toolchain selection
    pub toolchain: ToolchainPreference,

    /// Local version label
    pub local_version: Option<String>,

    /// Pre-read long description
    pub long_description: Option<String>,
}

impl Settings {
    pub fn new(project_root: impl Into<PathBuf>, python: PythonVersion) -> Self {
        Settings {
            project_root: project_root.into(),
            backend: DEFAULT_BACKEND.to_string(),
            python,
            policy: CompatPolicy::default(),
            toolchain: ToolchainPreference::default(),
            local_version: None,
            long_description: None,
        }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    pub fn with_policy(mut self, policy: CompatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_toolchain(mut self, toolchain: ToolchainPreference) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn with_local_version(mut self, local_version: Option<String>) -> Self {
        self.local_version = local_version;
        self
    }

    pub fn with_long_description(mut self, text: Option<String>) -> Self {
        self.long_description = text;
        self
    }
}

/// Progress of a dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Start,
    BackendSelected(BackendKind),
    SetupDispatched(BackendKind),
    Failed,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchState::Start => write!(f, "start"),
            DispatchState::BackendSelected(kind) => write!(f, "backend selected ({})", kind),
            DispatchState::SetupDispatched(kind) => write!(f, "setup dispatched ({})", kind),
            DispatchState::Failed => write!(f, "failed"),
        }
    }
}

/// Selects a backend and hands it the merged setup configuration.
pub struct Dispatcher {
    settings: Settings,
    resolver: VersionResolver,
    registry: BackendRegistry,
    probe: Box<dyn Fn() -> bool>,
    state: Cell<DispatchState>,
}

impl Dispatcher {
    /// Create a dispatcher reading the version from the project tree.
    pub fn new(settings: Settings) -> Self {
        let source = FileVersionSource::new(&settings.project_root);
        let resolver = VersionResolver::new(Box::new(source))
            .with_local_version(settings.local_version.clone());

        Dispatcher {
            settings,
            resolver,
            registry: BackendRegistry::new(),
            probe: Box::new(|| false),
            state: Cell::new(DispatchState::Start),
        }
    }

    /// Replace the version source.
    pub fn with_version_source(mut self, source: Box<dyn VersionSource>) -> Self {
        self.resolver =
            VersionResolver::new(source).with_local_version(self.settings.local_version.clone());
        self
    }

    /// Probe reporting whether the enhanced toolchain is available; only
    /// consulted when the toolchain preference is `auto`.
    pub fn with_toolchain_probe(mut self, probe: impl Fn() -> bool + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Where the last `run` ended; `Start` before any run.
    pub fn state(&self) -> DispatchState {
        self.state.get()
    }

    /// The resolved package version.
    pub fn version(&self) -> Result<&str> {
        self.resolver.resolve()
    }

    /// The packaging toolchain for this run.
    pub fn toolchain(&self) -> Box<dyn PackagingToolchain> {
        select_toolchain(self.settings.toolchain, || (self.probe)())
    }

    /// Metadata as seen by the given toolchain.
    pub fn metadata(&self, toolchain: &dyn PackagingToolchain) -> Result<MetadataRecord> {
        self.assembler().build(toolchain)
    }

    pub fn artifacts(&self) -> BuildArtifacts {
        build_artifacts(self.settings.python, &self.settings.policy)
    }

    pub fn layout(&self) -> PackageLayout {
        build_layout(self.settings.python, &self.settings.policy)
    }

    fn assembler(&self) -> MetadataAssembler<'_> {
        MetadataAssembler::new(&self.resolver, self.settings.policy)
            .with_long_description(self.settings.long_description.clone())
    }

    /// Check the interpreter, then map the selector to a backend.
    pub fn select_backend(&self) -> Result<&dyn BuildBackend> {
        self.settings.policy.check_supported(self.settings.python)?;

        let choice = BackendChoice::parse(&self.settings.backend);
        let kind = choice.kind()?;
        tracing::debug!("Backend selector '{}' -> {} backend", choice, kind);

        self.registry
            .get(kind)
            .ok_or_else(|| anyhow!("no {} backend registered", kind))
    }

    /// Build the merged setup arguments for a backend.
    pub fn setup_args(&self, backend: &dyn BuildBackend) -> Result<SetupConfig> {
        let toolchain = self.toolchain();
        let assembler = self.assembler();

        let inputs = SetupInputs {
            metadata: assembler.build(toolchain.as_ref())?,
            extra_metadata: assembler.extra()?,
            layout: self.layout(),
            artifacts: self.artifacts(),
            toolchain: toolchain.as_ref(),
            project_root: &self.settings.project_root,
        };

        backend.setup_args(&inputs)
    }

    /// Select a backend and call the entry point with its configuration.
    ///
    /// On error the dispatcher is left in [`DispatchState::Failed`].
    pub fn run(&self, entry: &dyn SetupEntryPoint) -> Result<DispatchState> {
        self.state.set(DispatchState::Start);

        let result = self.advance(entry);
        if result.is_err() {
            tracing::debug!("Dispatch failed after reaching state: {}", self.state.get());
            self.state.set(DispatchState::Failed);
        }

        result.map(|()| self.state.get())
    }

    fn advance(&self, entry: &dyn SetupEntryPoint) -> Result<()> {
        let backend = self.select_backend()?;
        self.state.set(DispatchState::BackendSelected(backend.kind()));

        let args = self.setup_args(backend)?;
        tracing::info!(
            "Dispatching {} {} to {}",
            crate::core::metadata::NAME,
            self.version()?,
            backend.entry_point()
        );

        entry.setup(backend, &args)?;
        self.state.set(DispatchState::SetupDispatched(backend.kind()));
        Ok(())
    }
}
