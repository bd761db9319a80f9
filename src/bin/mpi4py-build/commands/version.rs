//! `mpi4py-build version` command

use anyhow::Result;

use mpi4py_build::util::BuildEnv;

use super::build_context;
use crate::cli::GlobalArgs;

pub fn execute(global: &GlobalArgs, env: &BuildEnv) -> Result<()> {
    let ctx = build_context(global, env, None)?;
    println!("{}", ctx.dispatcher.version()?);
    Ok(())
}
