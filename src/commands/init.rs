use clap::Args;
use serde::Serialize;

use taskly_dev::scaffold::{self, InitReport};

use super::CmdResult;

#[derive(Args)]
pub struct InitArgs {}

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub command: &'static str,
    pub root: String,
    #[serde(flatten)]
    pub report: InitReport,
}

pub fn run(_args: InitArgs, global: &super::GlobalArgs) -> CmdResult<InitOutput> {
    let workspace = global.workspace()?;
    let report = scaffold::init(&workspace.root, &workspace.config.scaffold)?;

    Ok((
        InitOutput {
            command: "init",
            root: workspace.root.to_string_lossy().to_string(),
            report,
        },
        0,
    ))
}
