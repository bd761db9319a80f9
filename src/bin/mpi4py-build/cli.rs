//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// mpi4py-build - configure and dispatch the mpi4py build
#[derive(Parser)]
#[command(name = "mpi4py-build")]
#[command(author, version, about, long_about = None)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project root containing the mpi4py sources
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Python interpreter to build for (name or path)
    #[arg(long, global = true)]
    pub python: Option<String>,

    /// Interpreter version to assume instead of asking the interpreter (e.g. 3.11)
    #[arg(long, global = true)]
    pub python_version: Option<String>,

    /// Packaging toolchain: basic, enhanced, or auto
    #[arg(long, global = true)]
    pub toolchain: Option<String>,

    /// Public version to use instead of reading src/mpi4py/__init__.py
    #[arg(long, global = true)]
    pub base_version: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Select a backend and run its setup() with the merged configuration
    Setup(SetupArgs),

    /// Print the resolved package version
    Version,

    /// Print the package metadata as JSON
    Metadata(MetadataArgs),

    /// Print the extension and executable descriptors as JSON
    Artifacts,

    /// Print the package layout as JSON
    Layout,

    /// List build backends and their selectors
    Backends,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct SetupArgs {
    /// Backend selector (overrides MPI4PY_BUILD_BACKEND)
    #[arg(long)]
    pub backend: Option<String>,

    /// Print the setup call as JSON instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Write the setup call as JSON to a file instead of running it
    #[arg(long, conflicts_with = "dry_run")]
    pub out: Option<PathBuf>,

    /// Arguments passed through to setup() (e.g. build_ext --inplace)
    #[arg(last = true)]
    pub setup_args: Vec<String>,
}

#[derive(Args)]
pub struct MetadataArgs {
    /// Include the extended fields regardless of toolchain
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
