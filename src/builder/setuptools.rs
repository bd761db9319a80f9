//! Legacy backend - setuptools or plain distutils via mpidistutils.
//!
//! Descriptors are wrapped in the `Extension` / `Executable` shapes that
//! mpidistutils accepts. Dependency globs are expanded here, relative to
//! the project root, because distutils expects concrete file lists.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::builder::backend::{BackendKind, BuildBackend, SetupInputs};
use crate::builder::setup_config::SetupConfig;
use crate::core::artifact::{ArtifactDescriptor, ConfigureHook, Macro};
use crate::core::metadata::MetadataRecord;
use crate::util::fs::{glob_files, to_slash};

/// `mpidistutils.Extension` keyword arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extension {
    pub name: String,
    pub sources: Vec<String>,
    pub depends: Vec<String>,
    pub include_dirs: Vec<String>,
    pub define_macros: Vec<Macro>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure: Option<ConfigureHook>,
}

impl Extension {
    /// Wrap a descriptor, expanding its dependency globs under `root`.
    pub fn from_descriptor(desc: &ArtifactDescriptor, root: &Path) -> Result<Self> {
        Ok(Extension {
            name: desc.name.clone(),
            sources: desc.sources.clone(),
            depends: expand_depends(root, &desc.depends)?,
            include_dirs: desc.include_dirs.clone(),
            define_macros: desc.define_macros.clone(),
            configure: desc.configure.clone(),
        })
    }
}

/// `mpidistutils.Executable` keyword arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Executable {
    pub name: String,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_dir: Option<String>,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure: Option<ConfigureHook>,
}

impl Executable {
    pub fn from_descriptor(desc: &ArtifactDescriptor, root: &Path) -> Result<Self> {
        Ok(Executable {
            name: desc.name.clone(),
            optional: desc.optional,
            package: desc.package.clone(),
            dest_dir: desc.dest_dir.clone(),
            sources: desc.sources.clone(),
            depends: expand_depends(root, &desc.depends)?,
            configure: desc.configure.clone(),
        })
    }
}

fn expand_depends(root: &Path, patterns: &[String]) -> Result<Vec<String>> {
    let files = glob_files(root, patterns)?;
    Ok(files.iter().map(|p| to_slash(p)).collect())
}

/// The setuptools / distutils backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyBackend;

impl LegacyBackend {
    pub fn new() -> Self {
        LegacyBackend
    }
}

impl BuildBackend for LegacyBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Legacy
    }

    fn entry_point(&self) -> &'static str {
        "mpidistutils.setup"
    }

    fn description(&self) -> &'static str {
        "setuptools/distutils through mpidistutils"
    }

    fn prepare_metadata(&self, metadata: &mut MetadataRecord, inputs: &SetupInputs<'_>) {
        inputs
            .toolchain
            .extend_metadata(metadata, inputs.extra_metadata.clone());
    }

    fn builder_args(&self, inputs: &SetupInputs<'_>) -> Result<SetupConfig> {
        let root = inputs.project_root;

        let ext_modules = inputs
            .artifacts
            .extensions
            .iter()
            .map(|desc| Extension::from_descriptor(desc, root))
            .collect::<Result<Vec<_>>>()?;

        let executables = inputs
            .artifacts
            .executables
            .iter()
            .map(|desc| Executable::from_descriptor(desc, root))
            .collect::<Result<Vec<_>>>()?;

        let mut args = SetupConfig::new();
        args.insert_serialized("ext_modules", &ext_modules)?;
        args.insert_serialized("executables", &executables)?;
        args.insert_serialized("build_src", &inputs.artifacts.sources)?;

        if inputs.toolchain.supports_zip_safe() {
            args.insert("zip_safe", false);
        }

        Ok(args)
    }
}
