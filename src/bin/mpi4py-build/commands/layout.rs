//! `mpi4py-build layout` command

use anyhow::Result;

use mpi4py_build::util::BuildEnv;

use super::{build_context, print_json};
use crate::cli::GlobalArgs;

pub fn execute(global: &GlobalArgs, env: &BuildEnv) -> Result<()> {
    let ctx = build_context(global, env, None)?;
    print_json(&ctx.dispatcher.layout())
}
