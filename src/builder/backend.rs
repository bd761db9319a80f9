//! Backend selection and the BuildBackend trait.
//!
//! A backend turns the assembled metadata, package layout, and artifact
//! descriptors into the keyword arguments of its `setup()` entry point.

use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::builder::setup_config::SetupConfig;
use crate::core::artifact::BuildArtifacts;
use crate::core::error::SetupError;
use crate::core::layout::PackageLayout;
use crate::core::metadata::MetadataRecord;
use crate::core::toolchain::PackagingToolchain;

/// Normalize a backend selector: lower-case, `_` becomes `-`.
pub fn normalize_backend_name(raw: &str) -> String {
    raw.to_lowercase().replace('_', "-")
}

/// A backend selector after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendChoice {
    Default,
    Setuptools,
    Distutils,
    ScikitBuild,
    Skbuild,
    Unknown(String),
}

impl BackendChoice {
    /// Parse a raw selector. Never fails; unrecognized names become `Unknown`.
    pub fn parse(raw: &str) -> Self {
        let name = normalize_backend_name(raw);
        match name.as_str() {
            "default" => BackendChoice::Default,
            "setuptools" => BackendChoice::Setuptools,
            "distutils" => BackendChoice::Distutils,
            "scikit-build" => BackendChoice::ScikitBuild,
            "skbuild" => BackendChoice::Skbuild,
            _ => BackendChoice::Unknown(name),
        }
    }

    /// Normalized selector name.
    pub fn as_str(&self) -> &str {
        match self {
            BackendChoice::Default => "default",
            BackendChoice::Setuptools => "setuptools",
            BackendChoice::Distutils => "distutils",
            BackendChoice::ScikitBuild => "scikit-build",
            BackendChoice::Skbuild => "skbuild",
            BackendChoice::Unknown(name) => name,
        }
    }

    /// The backend path this selector leads to.
    pub fn kind(&self) -> Result<BackendKind, SetupError> {
        match self {
            BackendChoice::Default | BackendChoice::Setuptools | BackendChoice::Distutils => {
                Ok(BackendKind::Legacy)
            }
            BackendChoice::ScikitBuild | BackendChoice::Skbuild => Ok(BackendKind::CMake),
            BackendChoice::Unknown(name) => Err(SetupError::UnknownBackend(name.clone())),
        }
    }

    /// Every recognized selector.
    pub fn known() -> [BackendChoice; 5] {
        [
            BackendChoice::Default,
            BackendChoice::Setuptools,
            BackendChoice::Distutils,
            BackendChoice::ScikitBuild,
            BackendChoice::Skbuild,
        ]
    }
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The two backend paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// setuptools / distutils through mpidistutils
    Legacy,
    /// scikit-build driving CMake
    CMake,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Legacy => "legacy",
            BackendKind::CMake => "cmake",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a backend draws on to build its setup arguments.
pub struct SetupInputs<'a> {
    pub metadata: MetadataRecord,
    /// Extended metadata, merged according to the backend's policy.
    pub extra_metadata: MetadataRecord,
    pub layout: PackageLayout,
    pub artifacts: BuildArtifacts,
    pub toolchain: &'a dyn PackagingToolchain,
    pub project_root: &'a Path,
}

/// A build backend.
pub trait BuildBackend {
    /// Which path this backend implements.
    fn kind(&self) -> BackendKind;

    /// Dotted name of the `setup()` callable.
    fn entry_point(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Adjust the metadata record before merging.
    fn prepare_metadata(&self, metadata: &mut MetadataRecord, inputs: &SetupInputs<'_>);

    /// Backend-specific keyword arguments.
    fn builder_args(&self, inputs: &SetupInputs<'_>) -> Result<SetupConfig>;

    /// The complete merged mapping: metadata, then layout, then builder args.
    fn setup_args(&self, inputs: &SetupInputs<'_>) -> Result<SetupConfig> {
        let mut metadata = inputs.metadata.clone();
        self.prepare_metadata(&mut metadata, inputs);

        Ok(SetupConfig::merged([
            SetupConfig::from_serializable(&metadata)?,
            SetupConfig::from_serializable(&inputs.layout)?,
            self.builder_args(inputs)?,
        ]))
    }
}
