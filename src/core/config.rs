//! Loading and writing `taskly-dev.json`.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::defaults::WorkspaceConfig;
use crate::error::{Error, Result};
use crate::utils::io;

pub const CONFIG_FILE: &str = "taskly-dev.json";

/// Where the configuration came from.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    File,
    Defaults,
}

/// Path to taskly-dev.json for a project root.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load the workspace config, falling back to built-in defaults when the file is absent.
/// Invalid JSON or empty values are errors.
pub fn load(root: &Path) -> Result<(WorkspaceConfig, ConfigSource)> {
    let path = config_path(root);

    if !path.exists() {
        return Ok((WorkspaceConfig::default(), ConfigSource::Defaults));
    }

    let content = io::read_file(&path, &format!("read {}", path.display()))?;
    let config: WorkspaceConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.to_string_lossy().to_string(), e))?;

    validate(&config)?;
    Ok((config, ConfigSource::File))
}

/// Reject values that would produce broken tool invocations.
pub fn validate(config: &WorkspaceConfig) -> Result<()> {
    let required = [
        ("dotnet.configuration", &config.dotnet.configuration),
        ("tests.dir", &config.tests.dir),
        ("tests.project_pattern", &config.tests.project_pattern),
        ("web.dir", &config.web.dir),
        ("migration.project", &config.migration.project),
        ("migration.startup_project", &config.migration.startup_project),
        ("migration.context", &config.migration.context),
        ("migration.output_dir", &config.migration.output_dir),
        ("migration.configuration", &config.migration.configuration),
    ];

    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(Error::config_invalid_value(
                key,
                Some(value.clone()),
                "must not be empty",
            ));
        }
    }

    if let Some(idx) = config.dotnet.projects.iter().position(|p| p.trim().is_empty()) {
        return Err(Error::config_invalid_value(
            format!("dotnet.projects[{}]", idx),
            None,
            "project path must not be empty",
        ));
    }

    for (idx, image) in config.docker.images.iter().enumerate() {
        if image.tag.trim().is_empty() {
            return Err(Error::config_invalid_value(
                format!("docker.images[{}].tag", idx),
                None,
                "image tag must not be empty",
            ));
        }
    }

    for requirement in &config.requirements {
        if requirement.path.trim().is_empty() {
            return Err(Error::config_invalid_value(
                format!("requirements.{}", requirement.name),
                None,
                "requirement path must not be empty",
            ));
        }
    }

    Ok(())
}

/// Write the built-in defaults to taskly-dev.json.
///
/// Returns `false` when the file already exists; it is never overwritten.
pub fn write_defaults(root: &Path) -> Result<(PathBuf, bool)> {
    let path = config_path(root);
    let content = serde_json::to_string_pretty(&WorkspaceConfig::default())
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize config".to_string())))?;

    let created = io::write_new_file(&path, &format!("{}\n", content), "write config")?;
    Ok((path, created))
}
