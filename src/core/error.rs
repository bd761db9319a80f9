//! Configuration errors raised by the orchestration layer itself.
//!
//! Failures from collaborators (version source, backend entry point) are
//! not represented here; they travel as `anyhow::Error` unchanged.

use thiserror::Error;

use crate::core::interpreter::PythonVersion;

/// A fatal configuration error. These are reported and never retried.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("requires Python version {required} (found {found})")]
    UnsupportedPython {
        found: PythonVersion,
        required: String,
    },

    #[error("Unknown build backend '{0}'")]
    UnknownBackend(String),

    #[error("invalid Python version `{0}`, expected MAJOR.MINOR")]
    InvalidPythonVersion(String),

    #[error("invalid toolchain `{0}`, valid values: basic, enhanced, auto")]
    InvalidToolchain(String),
}
