//! `mpi4py-build setup` command
//!
//! Selects the backend and hands it the merged setup configuration, either
//! by running its `setup()` in Python or by writing the call out as JSON.

use anyhow::{anyhow, Result};

use mpi4py_build::builder::{JsonEntryPoint, PythonEntryPoint, SetupEntryPoint};
use mpi4py_build::util::BuildEnv;

use super::build_context;
use crate::cli::{GlobalArgs, SetupArgs};

pub fn execute(global: &GlobalArgs, env: &BuildEnv, args: SetupArgs) -> Result<()> {
    let ctx = build_context(global, env, args.backend.as_deref())?;

    let writes_json = args.dry_run || args.out.is_some();
    if writes_json && !args.setup_args.is_empty() {
        tracing::warn!(
            "Ignoring setup arguments without a Python run: {}",
            args.setup_args.join(" ")
        );
    }

    let entry: Box<dyn SetupEntryPoint> = match args.out {
        Some(path) => Box::new(JsonEntryPoint::file(path)),
        None if args.dry_run => Box::new(JsonEntryPoint::stdout()),
        None => {
            let python = ctx.python.clone().ok_or_else(|| {
                anyhow!("no Python interpreter available to run setup() (set PYTHON or use --python)")
            })?;
            Box::new(PythonEntryPoint::new(python, &global.root).with_setup_argv(args.setup_args))
        }
    };

    let state = ctx.dispatcher.run(entry.as_ref())?;
    tracing::debug!("Dispatch finished: {}", state);

    Ok(())
}
