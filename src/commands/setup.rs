use clap::Args;
use serde::Serialize;

use taskly_dev::setup::{self, SetupOptions, SetupReport};
use taskly_dev::SystemRunner;

use super::CmdResult;

#[derive(Args)]
pub struct SetupArgs {
    /// Only scaffold configuration files
    #[arg(long)]
    pub skip_migration: bool,

    /// Do not build the startup project before creating the migration
    #[arg(long)]
    pub skip_build: bool,
}

#[derive(Debug, Serialize)]
pub struct SetupOutput {
    pub command: &'static str,
    #[serde(flatten)]
    pub report: SetupReport,
}

pub fn run(args: SetupArgs, global: &super::GlobalArgs) -> CmdResult<SetupOutput> {
    let workspace = global.workspace()?;
    let options = SetupOptions {
        skip_migration: args.skip_migration,
        skip_build: args.skip_build,
    };

    let report = setup::run(&workspace.root, &workspace.config, &options, &SystemRunner)?;

    Ok((
        SetupOutput {
            command: "setup",
            report,
        },
        0,
    ))
}
