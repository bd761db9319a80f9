//! Installable package tree and bundled non-code files.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::interpreter::{CompatPolicy, PythonVersion};

/// Top-level package that owns the bundled data files.
pub const PACKAGE: &str = "mpi4py";

const PACKAGES: [&str; 3] = ["mpi4py", "mpi4py.futures", "mpi4py.util"];

// Newest entries last; old interpreters drop the trailing group.
const PACKAGE_DATA: [&str; 8] = [
    "*.pxd",
    "MPI*.h",
    "include/mpi4py/*.h",
    "include/mpi4py/*.i",
    "include/mpi4py/*.pxi",
    "py.typed",
    "*.pyi",
    "*/*.pyi",
];

/// Number of trailing package-data patterns old interpreters skip.
pub const VERSION_SENSITIVE_PATTERNS: usize = 3;

/// The package tree handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageLayout {
    pub packages: Vec<String>,
    pub package_data: BTreeMap<String, Vec<String>>,
    pub package_dir: BTreeMap<String, String>,
}

impl PackageLayout {
    /// Data patterns declared for a package.
    pub fn data_for(&self, package: &str) -> &[String] {
        self.package_data
            .get(package)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Declare the package layout for the given interpreter.
pub fn build_layout(python: PythonVersion, policy: &CompatPolicy) -> PackageLayout {
    let mut data: Vec<String> = PACKAGE_DATA.iter().map(|s| s.to_string()).collect();
    if python < policy.package_data_min_python {
        let keep = data.len().saturating_sub(VERSION_SENSITIVE_PATTERNS);
        data.truncate(keep);
    }

    PackageLayout {
        packages: PACKAGES.iter().map(|s| s.to_string()).collect(),
        package_data: BTreeMap::from([(PACKAGE.to_string(), data)]),
        package_dir: BTreeMap::from([(String::new(), "src".to_string())]),
    }
}
