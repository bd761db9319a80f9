//! mpi4py-build CLI - configure and dispatch the mpi4py build

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mpi4py_build::util::BuildEnv;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("mpi4py_build=debug")
    } else {
        EnvFilter::new("mpi4py_build=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // The only place the environment is read
    let env = BuildEnv::from_process();

    match cli.command {
        Commands::Setup(args) => commands::setup::execute(&cli.global, &env, args),
        Commands::Version => commands::version::execute(&cli.global, &env),
        Commands::Metadata(args) => commands::metadata::execute(&cli.global, &env, args),
        Commands::Artifacts => commands::artifacts::execute(&cli.global, &env),
        Commands::Layout => commands::layout::execute(&cli.global, &env),
        Commands::Backends => commands::backends::execute(&cli.global, &env),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
