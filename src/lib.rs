//! mpi4py-build - build-configuration orchestrator for mpi4py
//!
//! This crate assembles everything a Python packaging backend needs to
//! build mpi4py: the resolved version, package metadata, the extension and
//! executable descriptors, and the package layout. It then selects a backend
//! (setuptools/distutils or scikit-build) and hands it the merged
//! configuration.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use builder::{BackendChoice, BackendKind, BuildBackend, SetupConfig, SetupEntryPoint};
pub use core::{
    ArtifactDescriptor, CompatPolicy, MetadataRecord, PackageLayout, PythonVersion, SetupError,
    VersionResolver,
};
pub use ops::{Dispatcher, Settings};
