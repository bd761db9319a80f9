//! `mpi4py-build backends` command
//!
//! Lists the build backends, the selectors that reach them, and which one
//! the current environment selects.

use anyhow::Result;

use mpi4py_build::builder::{BackendChoice, BackendRegistry};
use mpi4py_build::util::config::{global_config_path, load_config, project_config_path};
use mpi4py_build::util::BuildEnv;

use crate::cli::GlobalArgs;

pub fn execute(global: &GlobalArgs, env: &BuildEnv) -> Result<()> {
    let global_path = global_config_path();
    let mut config = load_config(global_path.as_deref(), &project_config_path(&global.root));
    config.apply_env(env);

    let selected = BackendChoice::parse(config.backend());
    let selected_kind = selected.kind().ok();
    let registry = BackendRegistry::new();
    let known = BackendChoice::known();

    println!("Build Backends:");
    println!();

    for backend in registry.all() {
        let selectors: Vec<&str> = known
            .iter()
            .filter(|choice| choice.kind().ok() == Some(backend.kind()))
            .map(|choice| choice.as_str())
            .collect();

        let marker = if selected_kind == Some(backend.kind()) {
            " (selected)"
        } else {
            ""
        };

        println!("  {} - {}{}", backend.kind(), backend.description(), marker);
        println!("    Entry point: {}", backend.entry_point());
        println!("    Selectors:   {}", selectors.join(", "));
        println!();
    }

    if selected_kind.is_none() {
        tracing::warn!("Current selector '{}' matches no backend", selected);
    }

    Ok(())
}
