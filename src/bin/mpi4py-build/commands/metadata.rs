//! `mpi4py-build metadata` command
//!
//! Prints the metadata record as the selected toolchain would see it.

use anyhow::Result;

use mpi4py_build::core::toolchain::{EnhancedToolchain, PackagingToolchain};
use mpi4py_build::util::BuildEnv;

use super::{build_context, print_json};
use crate::cli::{GlobalArgs, MetadataArgs};

pub fn execute(global: &GlobalArgs, env: &BuildEnv, args: MetadataArgs) -> Result<()> {
    let ctx = build_context(global, env, None)?;

    let toolchain: Box<dyn PackagingToolchain> = if args.extended {
        Box::new(EnhancedToolchain)
    } else {
        ctx.dispatcher.toolchain()
    };
    tracing::debug!("Assembling metadata for the {} toolchain", toolchain.name());

    let record = ctx.dispatcher.metadata(toolchain.as_ref())?;
    print_json(&record)
}
