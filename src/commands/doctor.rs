use clap::Args;
use serde::Serialize;

use taskly_dev::config::ConfigSource;
use taskly_dev::doctor::{self, DoctorReport};
use taskly_dev::SystemRunner;

use super::CmdResult;

#[derive(Args)]
pub struct DoctorArgs {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorOutput {
    pub command: &'static str,
    pub config_source: ConfigSource,
    #[serde(flatten)]
    pub report: DoctorReport,
}

pub fn run(_args: DoctorArgs, global: &super::GlobalArgs) -> CmdResult<DoctorOutput> {
    let workspace = global.workspace()?;
    let report = doctor::run(&workspace.root, &workspace.config, &SystemRunner);
    let exit_code = if report.healthy { 0 } else { 1 };

    Ok((
        DoctorOutput {
            command: "doctor",
            config_source: workspace.source,
            report,
        },
        exit_code,
    ))
}
