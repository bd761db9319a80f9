//! CMake backend - scikit-build drives the CMake project in `src/mpi4py`.

use anyhow::Result;

use crate::builder::backend::{BackendKind, BuildBackend, SetupInputs};
use crate::builder::setup_config::SetupConfig;
use crate::core::metadata::MetadataRecord;

/// Directory holding the CMake project, relative to the project root.
pub const CMAKE_SOURCE_DIR: &str = "src/mpi4py";

/// The scikit-build backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CMakeBackend;

impl CMakeBackend {
    pub fn new() -> Self {
        CMakeBackend
    }
}

impl BuildBackend for CMakeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::CMake
    }

    fn entry_point(&self) -> &'static str {
        "skbuild.setup"
    }

    fn description(&self) -> &'static str {
        "scikit-build driving CMake"
    }

    // scikit-build sits on setuptools, so the extended fields always apply.
    fn prepare_metadata(&self, metadata: &mut MetadataRecord, inputs: &SetupInputs<'_>) {
        metadata.merge_additive(inputs.extra_metadata.clone());
    }

    fn builder_args(&self, _inputs: &SetupInputs<'_>) -> Result<SetupConfig> {
        let mut args = SetupConfig::new();
        args.insert("cmake_source_dir", CMAKE_SOURCE_DIR);
        Ok(args)
    }
}
