//! EF Core migrations through `dotnet ef`.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::console;
use crate::defaults::MigrationSettings;
use crate::error::{Error, Result};
use crate::executor::{self, Invocation, Runner};
use crate::paths;
use crate::tooling::{self, DOTNET};
use crate::utils::{io, validation};

pub const INITIAL_MIGRATION: &str = "InitialCreate";

#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Skip `dotnet build` of the startup project before generating.
    pub skip_build: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationOutput {
    pub name: String,
    pub output_dir: String,
    pub created_files: Vec<String>,
    pub built: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationEntry {
    pub id: String,
    pub name: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub file: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EfCommandOutput {
    pub action: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Validate and trim a migration name.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = validation::require_non_empty(name, "name", "Migration name cannot be empty.")?;

    if !validation::is_identifier(trimmed) {
        return Err(Error::validation_invalid_argument(
            "name",
            format!(
                "Migration name '{}' must be a valid C# identifier (letters, digits, '_'; not starting with a digit).",
                trimmed
            ),
            Some(trimmed.to_string()),
            None,
        ));
    }

    Ok(trimmed.to_string())
}

/// Files matching `*{name}*.cs` in the migrations directory.
pub fn find_existing(name: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/*{}*.cs",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(name)
    );

    let mut matches: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| {
            Error::validation_invalid_argument(
                "name",
                format!("Invalid migration name pattern '{}': {}", name, e),
                Some(name.to_string()),
                None,
            )
        })?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();

    matches.sort();
    Ok(matches)
}

fn cs_files(dir: &Path) -> BTreeSet<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "cs"))
                .collect()
        })
        .unwrap_or_default()
}

/// `--project .. --startup-project .. --context .. --configuration ..`
fn ef_target_args(settings: &MigrationSettings) -> Vec<String> {
    vec![
        "--project".to_string(),
        settings.project.clone(),
        "--startup-project".to_string(),
        settings.startup_project.clone(),
        "--context".to_string(),
        settings.context.clone(),
        "--configuration".to_string(),
        settings.configuration.clone(),
    ]
}

fn require_ef(runner: &dyn Runner, root: &Path) -> Result<()> {
    tooling::require(runner, DOTNET, "dotnet SDK not installed or not in PATH.")?;

    console::info("Checking EF tooling...");
    if !tooling::ef_available(runner, root) {
        return Err(Error::tool_unavailable(
            "dotnet-ef",
            "dotnet-ef not installed or not working.",
        )
        .with_hint("Install it with: dotnet tool install --global dotnet-ef"));
    }
    Ok(())
}

/// Create a migration: tooling check, duplicate check, build, `dotnet ef migrations add`.
pub fn add(
    root: &Path,
    settings: &MigrationSettings,
    name: &str,
    options: &AddOptions,
    runner: &dyn Runner,
) -> Result<MigrationOutput> {
    tooling::require(runner, DOTNET, "dotnet SDK not installed or not in PATH.")?;

    let name = validate_name(name)?;
    console::info(format!("Using migration name: {}", name));

    let output_dir = paths::join(root, &settings.output_dir);
    io::ensure_dir(&output_dir, "create migrations folder")?;
    console::info(format!("Migrations folder ready at {}", settings.output_dir));

    let existing = find_existing(&name, &output_dir)?;
    if !existing.is_empty() {
        return Err(Error::migration_already_exists(
            name,
            settings.output_dir.clone(),
            existing
                .iter()
                .map(|p| paths::relative(root, p))
                .collect(),
        ));
    }

    require_ef(runner, root)?;

    if !options.skip_build {
        console::info("Building project...");
        let build = Invocation::new(DOTNET, root).args([
            "build",
            settings.startup_project.as_str(),
            "--configuration",
            settings.configuration.as_str(),
        ]);
        let run = runner.run(&build);
        if !run.success {
            return Err(Error::build_failed(
                "Build failed. Migration aborted.",
                run.failure_details(&build),
            ));
        }
    }

    console::info("Running EF migration...");
    let before = cs_files(&output_dir);

    let ef = Invocation::new(DOTNET, root)
        .args(["ef", "migrations", "add", name.as_str()])
        .args(ef_target_args(settings))
        .args(["--output-dir", settings.output_dir.as_str()]);

    let run = runner.run(&ef);
    if !run.success {
        console::error(executor::format_failure("EF migration", &run, root));
        return Err(Error::migration_failed(
            "EF migration command failed - no files created.",
            run.failure_details(&ef),
        ));
    }

    let created_files = cs_files(&output_dir)
        .difference(&before)
        .map(|p| paths::relative(root, p))
        .collect();

    console::success(format!("Migration '{}' created successfully.", name));

    Ok(MigrationOutput {
        name,
        output_dir: settings.output_dir.clone(),
        created_files,
        built: !options.skip_build,
    })
}

fn migration_file_pattern() -> Result<Regex> {
    Regex::new(r"^(\d{14})_([A-Za-z_][A-Za-z0-9_]*)\.cs$")
        .map_err(|e| Error::internal_unexpected(e.to_string()))
}

/// Migrations on disk, oldest first.
///
/// Only `<timestamp>_<Name>.cs` files count; designer files and the model
/// snapshot are skipped.
pub fn list(root: &Path, settings: &MigrationSettings) -> Result<Vec<MigrationEntry>> {
    let dir = paths::join(root, &settings.output_dir);
    let pattern = migration_file_pattern()?;

    let mut entries: Vec<MigrationEntry> = cs_files(&dir)
        .into_iter()
        .filter_map(|path| {
            let file_name = path.file_name()?.to_string_lossy().to_string();
            let caps = pattern.captures(&file_name)?;
            let timestamp = caps.get(1)?.as_str().to_string();
            let name = caps.get(2)?.as_str().to_string();

            let created_at = NaiveDateTime::parse_from_str(&timestamp, "%Y%m%d%H%M%S")
                .ok()
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string());

            Some(MigrationEntry {
                id: format!("{}_{}", timestamp, name),
                name,
                timestamp,
                created_at,
                file: paths::relative(root, &path),
            })
        })
        .collect();

    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    Ok(entries)
}

fn run_ef(
    root: &Path,
    runner: &dyn Runner,
    action: &str,
    invocation: Invocation,
    target: Option<String>,
) -> Result<EfCommandOutput> {
    let run = runner.run(&invocation);
    if !run.success {
        console::error(executor::format_failure(action, &run, root));
        return Err(Error::migration_failed(
            format!("{} failed.", action),
            run.failure_details(&invocation),
        ));
    }

    Ok(EfCommandOutput {
        action: action.to_string(),
        command: run.command,
        target,
    })
}

/// Apply migrations to the database (`dotnet ef database update [target]`).
pub fn apply(
    root: &Path,
    settings: &MigrationSettings,
    target: Option<&str>,
    runner: &dyn Runner,
) -> Result<EfCommandOutput> {
    require_ef(runner, root)?;

    let target = target.map(str::trim).filter(|t| !t.is_empty());
    console::info(match target {
        Some(t) => format!("Updating database to migration '{}'...", t),
        None => "Updating database to the latest migration...".to_string(),
    });

    let invocation = Invocation::new(DOTNET, root)
        .args(["ef", "database", "update"])
        .args(target.map(str::to_string))
        .args(ef_target_args(settings));

    let output = run_ef(
        root,
        runner,
        "Database update",
        invocation,
        target.map(str::to_string),
    )?;
    console::success("Database updated.");
    Ok(output)
}

/// Remove the most recent migration (`dotnet ef migrations remove`).
pub fn remove(
    root: &Path,
    settings: &MigrationSettings,
    runner: &dyn Runner,
) -> Result<EfCommandOutput> {
    require_ef(runner, root)?;

    let invocation = Invocation::new(DOTNET, root)
        .args(["ef", "migrations", "remove"])
        .args(ef_target_args(settings));

    let output = run_ef(root, runner, "Migration remove", invocation, None)?;
    console::success("Last migration removed.");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::WorkspaceConfig;
    use crate::executor::testing::ScriptedRunner;
    use std::fs;

    fn settings() -> MigrationSettings {
        WorkspaceConfig::default().migration
    }

    fn migrations_dir(root: &Path) -> PathBuf {
        paths::join(root, &settings().output_dir)
    }

    #[test]
    fn validate_name_trims_and_checks_identifier() {
        assert_eq!(validate_name("  AddTags ").unwrap(), "AddTags");

        let empty = validate_name("   ").unwrap_err();
        assert_eq!(empty.message, "Migration name cannot be empty.");

        let invalid = validate_name("add tags").unwrap_err();
        assert_eq!(invalid.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn find_existing_matches_substring_glob() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("20240101120000_AddTags.cs"), "").unwrap();
        fs::write(dir.path().join("20240101120000_AddTags.Designer.cs"), "").unwrap();
        fs::write(dir.path().join("20240202120000_AddUsers.cs"), "").unwrap();

        let found = find_existing("AddTags", dir.path()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(find_existing("Reminders", dir.path()).unwrap().is_empty());
    }

    #[test]
    fn find_existing_on_missing_dir_is_empty() {
        let found = find_existing("AddTags", Path::new("/nonexistent/migrations")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn add_runs_tooling_check_build_and_ef_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = migrations_dir(dir.path());
        let hook_dir = out_dir.clone();
        let runner = ScriptedRunner::with_tools(&["dotnet"]).on("migrations add", move |_| {
            fs::write(hook_dir.join("20240301090000_AddTags.cs"), "").unwrap();
            fs::write(hook_dir.join("20240301090000_AddTags.Designer.cs"), "").unwrap();
        });

        let output = add(
            dir.path(),
            &settings(),
            "AddTags",
            &AddOptions::default(),
            &runner,
        )
        .unwrap();

        assert!(out_dir.is_dir());
        assert_eq!(output.name, "AddTags");
        assert!(output.built);
        assert_eq!(output.created_files.len(), 2);

        let commands = runner.commands();
        assert_eq!(commands[0], "dotnet ef --help");
        assert_eq!(
            commands[1],
            "dotnet build src/Api/Api.csproj --configuration Debug"
        );
        assert_eq!(
            commands[2],
            "dotnet ef migrations add AddTags --project src/Api/Api.csproj \
             --startup-project src/Api/Api.csproj \
             --context Api.Infrastructure.Data.ApplicationDbContext \
             --configuration Debug --output-dir src/Api/Infrastructure/Data/Migrations"
        );
    }

    #[test]
    fn add_rejects_duplicate_before_invoking_tools() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = migrations_dir(dir.path());
        fs::create_dir_all(&out_dir).unwrap();
        fs::write(out_dir.join("20240101120000_AddTags.cs"), "").unwrap();

        let runner = ScriptedRunner::with_tools(&["dotnet"]);
        let err = add(
            dir.path(),
            &settings(),
            "AddTags",
            &AddOptions::default(),
            &runner,
        )
        .unwrap_err();

        assert_eq!(err.code.as_str(), "migration.already_exists");
        assert_eq!(
            err.details["directory"],
            "src/Api/Infrastructure/Data/Migrations"
        );
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn add_requires_dotnet() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_tools(&[]);
        let err = add(
            dir.path(),
            &settings(),
            "AddTags",
            &AddOptions::default(),
            &runner,
        )
        .unwrap_err();

        assert_eq!(err.code.as_str(), "tool.not_found");
    }

    #[test]
    fn add_reports_missing_ef_tool() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_tools(&["dotnet"]).fail_on("ef --help", 1, "");
        let err = add(
            dir.path(),
            &settings(),
            "AddTags",
            &AddOptions::default(),
            &runner,
        )
        .unwrap_err();

        assert_eq!(err.code.as_str(), "tool.unavailable");
        assert_eq!(err.message, "dotnet-ef not installed or not working.");
    }

    #[test]
    fn add_aborts_when_build_fails() {
        let dir = tempfile::tempdir().unwrap();
        let runner =
            ScriptedRunner::with_tools(&["dotnet"]).fail_on("dotnet build", 1, "CS1002: ; expected");
        let err = add(
            dir.path(),
            &settings(),
            "AddTags",
            &AddOptions::default(),
            &runner,
        )
        .unwrap_err();

        assert_eq!(err.code.as_str(), "build.failed");
        assert_eq!(err.message, "Build failed. Migration aborted.");
        assert!(!runner.commands().iter().any(|c| c.contains("migrations add")));
    }

    #[test]
    fn add_skip_build_and_ef_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_tools(&["dotnet"]).fail_on(
            "migrations add",
            1,
            "Unable to create a 'DbContext'",
        );
        let err = add(
            dir.path(),
            &settings(),
            "AddTags",
            &AddOptions { skip_build: true },
            &runner,
        )
        .unwrap_err();

        assert_eq!(err.code.as_str(), "migration.failed");
        assert_eq!(err.details["stderr"], "Unable to create a 'DbContext'");
        assert!(!runner.commands().iter().any(|c| c.starts_with("dotnet build")));
    }

    #[test]
    fn list_parses_and_orders_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = migrations_dir(dir.path());
        fs::create_dir_all(&out_dir).unwrap();
        fs::write(out_dir.join("20240202120000_AddUsers.cs"), "").unwrap();
        fs::write(out_dir.join("20240101120000_InitialCreate.cs"), "").unwrap();
        fs::write(out_dir.join("20240101120000_InitialCreate.Designer.cs"), "").unwrap();
        fs::write(out_dir.join("ApplicationDbContextModelSnapshot.cs"), "").unwrap();

        let entries = list(dir.path(), &settings()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "InitialCreate");
        assert_eq!(entries[0].id, "20240101120000_InitialCreate");
        assert_eq!(entries[0].created_at.as_deref(), Some("2024-01-01T12:00:00"));
        assert_eq!(
            entries[0].file,
            "src/Api/Infrastructure/Data/Migrations/20240101120000_InitialCreate.cs"
        );
        assert_eq!(entries[1].name, "AddUsers");
    }

    #[test]
    fn list_without_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list(dir.path(), &settings()).unwrap().is_empty());
    }

    #[test]
    fn apply_passes_optional_target() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_tools(&["dotnet"]);

        let output = apply(dir.path(), &settings(), Some("InitialCreate"), &runner).unwrap();
        assert_eq!(output.target.as_deref(), Some("InitialCreate"));
        assert!(output
            .command
            .starts_with("dotnet ef database update InitialCreate --project"));

        let latest = apply(dir.path(), &settings(), None, &runner).unwrap();
        assert!(latest.command.starts_with("dotnet ef database update --project"));
    }

    #[test]
    fn remove_reports_ef_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_tools(&["dotnet"]).fail_on(
            "migrations remove",
            1,
            "The migration has already been applied",
        );

        let err = remove(dir.path(), &settings(), &runner).unwrap_err();
        assert_eq!(err.code.as_str(), "migration.failed");
        assert_eq!(err.message, "Migration remove failed.");
    }
}
