//! Core data model for the mpi4py build.
//!
//! This module contains the declarative pieces handed to a backend:
//! - Version resolution and package metadata
//! - Compiled artifact descriptors
//! - The installable package layout
//! - Interpreter versions and the compatibility policy
//! - Packaging toolchain capabilities

pub mod artifact;
pub mod error;
pub mod interpreter;
pub mod layout;
pub mod metadata;
pub mod toolchain;
pub mod version;

pub use artifact::{build_artifacts, ArtifactDescriptor, BuildArtifacts, SourceUnit};
pub use error::SetupError;
pub use interpreter::{CompatPolicy, PythonVersion};
pub use layout::{build_layout, PackageLayout};
pub use metadata::{MetadataAssembler, MetadataKey, MetadataRecord, MetadataValue};
pub use toolchain::{select_toolchain, PackagingToolchain, ToolchainPreference};
pub use version::{FileVersionSource, StaticVersionSource, VersionResolver, VersionSource};
