use clap::{Args, Subcommand};
use serde::Serialize;

use taskly_dev::config::{self, ConfigSource};
use taskly_dev::defaults::WorkspaceConfig;

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display the effective configuration (defaults merged with taskly-dev.json)
    Show,
    /// Show the path to taskly-dev.json
    Path,
    /// Write taskly-dev.json with the built-in defaults (never overwrites)
    Init,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: &'static str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<ConfigSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<WorkspaceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<bool>,
}

pub fn run(args: ConfigArgs, global: &super::GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show => show(global),
        ConfigCommand::Path => path(global),
        ConfigCommand::Init => init(global),
    }
}

fn show(global: &super::GlobalArgs) -> CmdResult<ConfigOutput> {
    let workspace = global.workspace()?;
    Ok((
        ConfigOutput {
            command: "config.show",
            path: config::config_path(&workspace.root).to_string_lossy().to_string(),
            exists: None,
            source: Some(workspace.source),
            config: Some(workspace.config),
            created: None,
        },
        0,
    ))
}

fn path(global: &super::GlobalArgs) -> CmdResult<ConfigOutput> {
    let path = config::config_path(&global.root()?);
    Ok((
        ConfigOutput {
            command: "config.path",
            exists: Some(path.is_file()),
            path: path.to_string_lossy().to_string(),
            source: None,
            config: None,
            created: None,
        },
        0,
    ))
}

fn init(global: &super::GlobalArgs) -> CmdResult<ConfigOutput> {
    let (path, created) = config::write_defaults(&global.root()?)?;
    Ok((
        ConfigOutput {
            command: "config.init",
            path: path.to_string_lossy().to_string(),
            exists: Some(true),
            source: None,
            config: None,
            created: Some(created),
        },
        0,
    ))
}
