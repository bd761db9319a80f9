//! Compiled artifact descriptors.
//!
//! Descriptors are pure data: building them never touches the filesystem
//! or a compiler. Missing sources and failed MPI probes surface later, when
//! the backend acts on them.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::core::interpreter::{CompatPolicy, PythonVersion};

/// Macros that keep MPI implementations from pulling in their C++ bindings.
pub const SKIP_MPICXX_MACROS: [&str; 2] = ["MPICH_SKIP_MPICXX", "OMPI_SKIP_MPICXX"];

/// Cython fast paths disabled on interpreters newer than the validated one.
pub const CYTHON_COMPAT_MACROS: [&str; 6] = [
    "CYTHON_FAST_PYCALL",
    "CYTHON_FAST_THREAD_STATE",
    "CYTHON_USE_DICT_VERSIONS",
    "CYTHON_USE_PYLONG_INTERNALS",
    "CYTHON_USE_PYLIST_INTERNALS",
    "CYTHON_USE_UNICODE_INTERNALS",
];

/// Reference to an external configure callable, resolved by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureHook {
    pub module: &'static str,
    pub function: &'static str,
}

impl ConfigureHook {
    /// Probe that adds MPI compiler and linker flags to the extension.
    pub const CONFIGURE_MPI: ConfigureHook = ConfigureHook {
        module: "mpidistutils",
        function: "configure_mpi",
    };

    /// Probe that adds MPI flags to the `python-mpi` executable.
    pub const CONFIGURE_PYEXE: ConfigureHook = ConfigureHook {
        module: "mpidistutils",
        function: "configure_pyexe",
    };
}

impl fmt::Display for ConfigureHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.function)
    }
}

impl Serialize for ConfigureHook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A `(name, value)` preprocessor definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Macro(pub String, pub i64);

impl Macro {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Macro(name.into(), value)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Whether a descriptor is an importable module or a standalone program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Extension,
    Executable,
}

/// Describes one compiled output and how to build it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    pub kind: ArtifactKind,

    pub name: String,

    pub sources: Vec<String>,

    /// Glob patterns of files that invalidate a cached build.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_dirs: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub define_macros: Vec<Macro>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure: Option<ConfigureHook>,

    /// A failed build of an optional artifact must not abort packaging.
    pub optional: bool,

    /// Package an executable is installed alongside.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    /// Directory, relative to the package, receiving an executable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_dir: Option<String>,
}

impl ArtifactDescriptor {
    fn new(kind: ArtifactKind, name: &str) -> Self {
        ArtifactDescriptor {
            kind,
            name: name.to_string(),
            sources: Vec::new(),
            depends: Vec::new(),
            include_dirs: Vec::new(),
            define_macros: Vec::new(),
            configure: None,
            optional: false,
            package: None,
            dest_dir: None,
        }
    }

    pub fn has_macro(&self, name: &str) -> bool {
        self.define_macros.iter().any(|m| m.name() == name)
    }
}

/// A unit fed to the external source-generation (Cython) step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    pub source: String,
    pub depends: Vec<String>,
    /// Directory the generator runs in.
    pub workdir: String,
}

/// Everything the backend needs to compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildArtifacts {
    pub sources: Vec<SourceUnit>,
    pub extensions: Vec<ArtifactDescriptor>,
    pub executables: Vec<ArtifactDescriptor>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Source units for the generator.
pub fn sources() -> Vec<SourceUnit> {
    vec![SourceUnit {
        source: "mpi4py/MPI.pyx".to_string(),
        depends: strings(&[
            "mpi4py/*.pyx",
            "mpi4py/*.pxd",
            "mpi4py/MPI/*.pyx",
            "mpi4py/MPI/*.pxd",
            "mpi4py/MPI/*.pxi",
        ]),
        workdir: "src".to_string(),
    }]
}

/// Extension modules for the given interpreter.
pub fn extensions(python: PythonVersion, policy: &CompatPolicy) -> Vec<ArtifactDescriptor> {
    let mut mpi = ArtifactDescriptor::new(ArtifactKind::Extension, "mpi4py.MPI");
    mpi.sources = strings(&["src/mpi4py/MPI.c"]);
    mpi.depends = strings(&[
        "src/*.h",
        "src/lib-mpi/*.h",
        "src/lib-mpi/config/*.h",
        "src/lib-mpi/compat/*.h",
    ]);
    mpi.include_dirs = strings(&["src"]);
    mpi.define_macros = SKIP_MPICXX_MACROS
        .iter()
        .map(|name| Macro::new(*name, 1))
        .collect();
    mpi.configure = Some(ConfigureHook::CONFIGURE_MPI);

    if policy.is_beyond_known(python) {
        tracing::debug!(
            "Python {} is newer than {}, disabling Cython fast paths",
            python,
            policy.maxknown_python
        );
        mpi.define_macros
            .extend(CYTHON_COMPAT_MACROS.iter().map(|name| Macro::new(*name, 0)));
    }

    vec![mpi]
}

/// Companion executables.
pub fn executables() -> Vec<ArtifactDescriptor> {
    let mut pyexe = ArtifactDescriptor::new(ArtifactKind::Executable, "python-mpi");
    pyexe.optional = true;
    pyexe.package = Some("mpi4py".to_string());
    pyexe.dest_dir = Some("bin".to_string());
    pyexe.sources = strings(&["src/python.c"]);
    pyexe.configure = Some(ConfigureHook::CONFIGURE_PYEXE);

    vec![pyexe]
}

/// All artifacts for the given interpreter.
pub fn build_artifacts(python: PythonVersion, policy: &CompatPolicy) -> BuildArtifacts {
    BuildArtifacts {
        sources: sources(),
        extensions: extensions(python, policy),
        executables: executables(),
    }
}
