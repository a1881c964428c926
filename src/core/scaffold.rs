//! Configuration file templates written by `init` and `setup`.

use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;

use crate::console;
use crate::defaults::ScaffoldPaths;
use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

const ENV_CONTENT: &str = "# Auth0 Configuration
VITE_AUTH0_DOMAIN=your-auth0-domain
VITE_AUTH0_CLIENT_ID=your-auth0-client-id
";

fn logging_section() -> Value {
    json!({
        "LogLevel": {
            "Default": "Information",
            "Microsoft.AspNetCore": "Warning"
        }
    })
}

pub fn appsettings_api_template() -> Value {
    json!({
        "Logging": logging_section(),
        "AllowedHosts": "*",
        "Auth0": {
            "Domain": "your-auth0-domain",
            "Audience": "your-auth0-audience",
            "ClientId": "your-auth0-client-id",
            "ClientSecret": "your-auth0-client-secret",
            "UsePersistentStorage": false
        },
        "ConnectionStrings": {
            "AzureBlobStorage": "your-azure-blob-storage-connection-string"
        }
    })
}

pub fn appsettings_integration_template() -> Value {
    let mut template = appsettings_api_template();
    template["Auth0"]["Grant_Type"] = json!("client_credentials");
    template
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScaffoldStatus {
    Created,
    Exists,
}

/// A file `init` knows how to create.
#[derive(Debug, Clone)]
pub struct ScaffoldFile {
    pub label: String,
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldResult {
    pub label: String,
    pub path: String,
    pub status: ScaffoldStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitReport {
    pub files: Vec<ScaffoldResult>,
    pub created: usize,
    pub existing: usize,
}

fn pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::internal_json(e.to_string(), Some("render template".to_string())))
}

/// The `.env` file and both appsettings files, in creation order.
pub fn files(scaffold: &ScaffoldPaths) -> Result<Vec<ScaffoldFile>> {
    Ok(vec![
        ScaffoldFile {
            label: ".env".to_string(),
            path: scaffold.env_file.clone(),
            content: ENV_CONTENT.to_string(),
        },
        ScaffoldFile {
            label: "appsettings.json".to_string(),
            path: scaffold.appsettings_api.clone(),
            content: pretty(&appsettings_api_template())?,
        },
        ScaffoldFile {
            label: "appsettings.integration.json".to_string(),
            path: scaffold.appsettings_integration.clone(),
            content: pretty(&appsettings_integration_template())?,
        },
    ])
}

/// Create a file from its template unless it already exists.
pub fn create_if_missing(root: &Path, file: &ScaffoldFile) -> Result<ScaffoldResult> {
    let target = paths::join(root, &file.path);
    let created = io::write_new_file(&target, &file.content, &format!("create {}", file.path))?;

    let status = if created {
        console::success(format!("Created {}", file.label));
        ScaffoldStatus::Created
    } else {
        console::success(format!("{} already exists", file.label));
        ScaffoldStatus::Exists
    };

    Ok(ScaffoldResult {
        label: file.label.clone(),
        path: file.path.clone(),
        status,
    })
}

/// Create every missing configuration file. Existing files are left untouched.
pub fn init(root: &Path, scaffold: &ScaffoldPaths) -> Result<InitReport> {
    console::info("Initializing Taskly configuration files...");

    let results = files(scaffold)?
        .iter()
        .map(|file| create_if_missing(root, file))
        .collect::<Result<Vec<_>>>()?;

    let created = results
        .iter()
        .filter(|r| r.status == ScaffoldStatus::Created)
        .count();

    console::success("Initialization completed! You can now configure your values.");

    Ok(InitReport {
        existing: results.len() - created,
        created,
        files: results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::WorkspaceConfig;
    use std::fs;

    fn scaffold() -> ScaffoldPaths {
        WorkspaceConfig::default().scaffold
    }

    #[test]
    fn integration_template_adds_grant_type_only() {
        let api = appsettings_api_template();
        let integration = appsettings_integration_template();

        assert!(api["Auth0"].get("Grant_Type").is_none());
        assert_eq!(integration["Auth0"]["Grant_Type"], "client_credentials");
        assert_eq!(integration["Auth0"]["ClientId"], api["Auth0"]["ClientId"]);
        assert_eq!(integration["Auth0"]["UsePersistentStorage"], false);
    }

    #[test]
    fn json_templates_use_two_space_indent() {
        let rendered = pretty(&appsettings_api_template()).unwrap();
        assert!(rendered.starts_with("{\n  \""));
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["Logging"]["LogLevel"]["Default"], "Information");
        assert_eq!(parsed["AllowedHosts"], "*");
    }

    #[test]
    fn init_creates_all_files_in_fresh_root() {
        let dir = tempfile::tempdir().unwrap();
        let report = init(dir.path(), &scaffold()).unwrap();

        assert_eq!(report.created, 3);
        assert_eq!(report.existing, 0);

        let env = fs::read_to_string(dir.path().join("src/Web/.env")).unwrap();
        assert!(env.starts_with("# Auth0 Configuration\n"));
        assert!(env.contains("VITE_AUTH0_CLIENT_ID=your-auth0-client-id"));

        let api: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("src/Api/appsettings.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            api["ConnectionStrings"]["AzureBlobStorage"],
            "your-azure-blob-storage-connection-string"
        );

        assert!(dir
            .path()
            .join("tests/IntegrationTests/appsettings.integration.json")
            .is_file());
    }

    #[test]
    fn init_is_idempotent_and_preserves_edits() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path(), &scaffold()).unwrap();

        let api_path = dir.path().join("src/Api/appsettings.json");
        fs::write(&api_path, "{\"edited\": true}").unwrap();

        let report = init(dir.path(), &scaffold()).unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.existing, 3);
        assert!(report
            .files
            .iter()
            .all(|f| f.status == ScaffoldStatus::Exists));
        assert_eq!(fs::read_to_string(&api_path).unwrap(), "{\"edited\": true}");
    }
}
