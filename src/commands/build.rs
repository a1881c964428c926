use clap::Args;
use serde::Serialize;

use taskly_dev::build::{self, BuildOptions, BuildReport};
use taskly_dev::SystemRunner;

use super::CmdResult;

#[derive(Args)]
pub struct BuildArgs {
    /// Run the test projects after building
    #[arg(long)]
    pub test: bool,

    /// Install and build the frontend
    #[arg(long)]
    pub frontend: bool,

    /// Build the configured container images
    #[arg(long)]
    pub docker: bool,

    /// Skip the file requirement checks
    #[arg(long)]
    pub skip_requirements: bool,

    /// Build configuration (defaults to dotnet.configuration)
    #[arg(long, short = 'c')]
    pub configuration: Option<String>,

    /// Test filter forwarded to `dotnet test` (with --test)
    #[arg(long, requires = "test")]
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BuildOutput {
    pub command: &'static str,
    #[serde(flatten)]
    pub report: BuildReport,
}

pub fn run(args: BuildArgs, global: &super::GlobalArgs) -> CmdResult<BuildOutput> {
    let workspace = global.workspace()?;
    let options = BuildOptions {
        test: args.test,
        frontend: args.frontend,
        docker: args.docker,
        skip_requirements: args.skip_requirements,
        configuration: args.configuration,
        test_filter: args.filter,
    };

    let report = build::run(&workspace.root, &workspace.config, &options, &SystemRunner)?;

    Ok((
        BuildOutput {
            command: "build",
            report,
        },
        0,
    ))
}
