use clap::{Args, Subcommand};
use serde::Serialize;

use taskly_dev::migration::{self, AddOptions, EfCommandOutput, MigrationEntry, MigrationOutput};
use taskly_dev::{Error, SystemRunner};

use super::CmdResult;
use crate::tty;

#[derive(Args)]
pub struct MigrationArgs {
    #[command(subcommand)]
    command: MigrationCommand,
}

#[derive(Subcommand)]
enum MigrationCommand {
    /// Create a new EF Core migration
    Add {
        /// Migration name (prompted for when omitted on a terminal)
        name: Option<String>,

        /// Skip building the startup project first
        #[arg(long)]
        skip_build: bool,
    },
    /// List migrations on disk, oldest first
    List,
    /// Apply migrations to the database
    Apply {
        /// Target migration (defaults to the latest)
        target: Option<String>,
    },
    /// Remove the most recent migration
    Remove,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MigrationOutputData {
    Added(MigrationOutput),
    Listed {
        directory: String,
        count: usize,
        migrations: Vec<MigrationEntry>,
    },
    Ef(EfCommandOutput),
}

#[derive(Debug, Serialize)]
pub struct MigrationCommandOutput {
    pub command: &'static str,
    #[serde(flatten)]
    pub data: MigrationOutputData,
}

pub fn run(args: MigrationArgs, global: &super::GlobalArgs) -> CmdResult<MigrationCommandOutput> {
    let workspace = global.workspace()?;
    let root = &workspace.root;
    let settings = &workspace.config.migration;

    let (command, data) = match args.command {
        MigrationCommand::Add { name, skip_build } => {
            let name = resolve_name(name, tty::can_prompt())?;
            let output = migration::add(
                root,
                settings,
                &name,
                &AddOptions { skip_build },
                &SystemRunner,
            )?;
            ("migration.add", MigrationOutputData::Added(output))
        }
        MigrationCommand::List => {
            let migrations = migration::list(root, settings)?;
            (
                "migration.list",
                MigrationOutputData::Listed {
                    directory: settings.output_dir.clone(),
                    count: migrations.len(),
                    migrations,
                },
            )
        }
        MigrationCommand::Apply { target } => {
            let output = migration::apply(root, settings, target.as_deref(), &SystemRunner)?;
            ("migration.apply", MigrationOutputData::Ef(output))
        }
        MigrationCommand::Remove => {
            let output = migration::remove(root, settings, &SystemRunner)?;
            ("migration.remove", MigrationOutputData::Ef(output))
        }
    };

    Ok((MigrationCommandOutput { command, data }, 0))
}

fn resolve_name(name: Option<String>, can_prompt: bool) -> taskly_dev::Result<String> {
    if let Some(name) = name {
        return Ok(name);
    }

    if !can_prompt {
        return Err(Error::validation_missing_argument(vec!["name".to_string()])
            .with_hint("Pass the migration name: taskly-dev migration add <NAME>"));
    }

    let name = tty::prompt("Enter migration name: ")?;
    if name.is_empty() {
        return Err(Error::validation_missing_argument(vec!["name".to_string()]));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_name_without_terminal_is_missing_argument() {
        let err = resolve_name(None, false).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.missing_argument");
        assert_eq!(err.details["args"][0], "name");
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn given_name_is_used_without_prompting() {
        assert_eq!(resolve_name(Some("AddTags".to_string()), false).unwrap(), "AddTags");
    }
}
