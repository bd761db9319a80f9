//! Build backends and the hand-off to their `setup()` entry points.
//!
//! ```text
//!   metadata ─┐
//!   layout ───┼─► BuildBackend::setup_args ─► SetupConfig ─► SetupEntryPoint
//!   artifacts ┘        (legacy | cmake)                      (json | python)
//! ```

pub mod backend;
pub mod entry_point;
pub mod registry;
pub mod setup_config;
pub mod setuptools;
pub mod skbuild;

pub use backend::{normalize_backend_name, BackendChoice, BackendKind, BuildBackend, SetupInputs};
pub use entry_point::{JsonEntryPoint, PythonEntryPoint, SetupCall, SetupEntryPoint};
pub use registry::BackendRegistry;
pub use setup_config::SetupConfig;
pub use setuptools::LegacyBackend;
pub use skbuild::CMakeBackend;
