//! One-shot onboarding: scaffold configuration, then create the initial migration.

use serde::Serialize;
use std::path::Path;

use crate::console;
use crate::defaults::WorkspaceConfig;
use crate::error::Result;
use crate::executor::Runner;
use crate::migration::{self, AddOptions, MigrationOutput, INITIAL_MIGRATION};
use crate::paths;
use crate::scaffold::{self, InitReport};

#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    pub skip_migration: bool,
    pub skip_build: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MigrationStep {
    Created(MigrationOutput),
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupReport {
    pub init: InitReport,
    pub migration: MigrationStep,
}

pub fn run(
    root: &Path,
    config: &WorkspaceConfig,
    options: &SetupOptions,
    runner: &dyn Runner,
) -> Result<SetupReport> {
    let init = scaffold::init(root, &config.scaffold)?;

    let migration = if options.skip_migration {
        MigrationStep::Skipped {
            reason: "--skip-migration".to_string(),
        }
    } else {
        let dir = paths::join(root, &config.migration.output_dir);
        if !migration::find_existing(INITIAL_MIGRATION, &dir)?.is_empty() {
            console::info(format!(
                "Migration '{}' already exists, skipping.",
                INITIAL_MIGRATION
            ));
            MigrationStep::Skipped {
                reason: format!("{} already exists", INITIAL_MIGRATION),
            }
        } else {
            console::info("Creating initial database migration...");
            let output = migration::add(
                root,
                &config.migration,
                INITIAL_MIGRATION,
                &AddOptions {
                    skip_build: options.skip_build,
                },
                runner,
            )?;
            MigrationStep::Created(output)
        }
    };

    Ok(SetupReport { init, migration })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::ScriptedRunner;
    use std::fs;

    #[test]
    fn setup_scaffolds_then_creates_initial_migration() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_tools(&["dotnet"]);

        let report = run(
            dir.path(),
            &WorkspaceConfig::default(),
            &SetupOptions::default(),
            &runner,
        )
        .unwrap();

        assert_eq!(report.init.created, 3);
        match report.migration {
            MigrationStep::Created(output) => assert_eq!(output.name, "InitialCreate"),
            other => panic!("expected migration to be created, got {:?}", other),
        }
        assert!(runner
            .commands()
            .iter()
            .any(|c| c.starts_with("dotnet ef migrations add InitialCreate")));
    }

    #[test]
    fn setup_skips_existing_initial_migration() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkspaceConfig::default();
        let migrations = paths::join(dir.path(), &config.migration.output_dir);
        fs::create_dir_all(&migrations).unwrap();
        fs::write(migrations.join("20240101000000_InitialCreate.cs"), "").unwrap();

        let runner = ScriptedRunner::with_tools(&["dotnet"]);
        let report = run(dir.path(), &config, &SetupOptions::default(), &runner).unwrap();

        assert!(matches!(report.migration, MigrationStep::Skipped { .. }));
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn setup_can_skip_migration_entirely() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_tools(&[]);
        let options = SetupOptions {
            skip_migration: true,
            ..Default::default()
        };

        let report = run(dir.path(), &WorkspaceConfig::default(), &options, &runner).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["migration"]["status"], "skipped");
        assert_eq!(json["migration"]["reason"], "--skip-migration");
    }
}
