use serde::{Deserialize, Serialize};

/// Root configuration structure for taskly-dev.json
///
/// Every field falls back to the layout of the Taskly solution, so a missing
/// file and an empty `{}` behave the same.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceConfig {
    #[serde(default = "default_dotnet")]
    pub dotnet: DotnetConfig,

    #[serde(default = "default_tests")]
    pub tests: TestsConfig,

    #[serde(default = "default_web")]
    pub web: WebConfig,

    #[serde(default = "default_migration")]
    pub migration: MigrationSettings,

    #[serde(default = "default_requirements")]
    pub requirements: Vec<Requirement>,

    #[serde(default = "default_docker")]
    pub docker: DockerConfig,

    #[serde(default = "default_scaffold")]
    pub scaffold: ScaffoldPaths,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dotnet: default_dotnet(),
            tests: default_tests(),
            web: default_web(),
            migration: default_migration(),
            requirements: default_requirements(),
            docker: default_docker(),
            scaffold: default_scaffold(),
        }
    }
}

/// .NET projects built by `build`, in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DotnetConfig {
    #[serde(default = "default_dotnet_projects")]
    pub projects: Vec<String>,

    #[serde(default = "default_configuration")]
    pub configuration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestsConfig {
    #[serde(default = "default_tests_dir")]
    pub dir: String,

    /// File-name glob matched recursively under `dir`.
    #[serde(default = "default_test_project_pattern")]
    pub project_pattern: String,
}

/// Frontend package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebConfig {
    #[serde(default = "default_web_dir")]
    pub dir: String,

    #[serde(default = "default_web_build_script")]
    pub build_script: String,

    #[serde(default = "default_web_test_script")]
    pub test_script: String,
}

/// Arguments handed to `dotnet ef`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MigrationSettings {
    #[serde(default = "default_migration_project")]
    pub project: String,

    #[serde(default = "default_migration_project")]
    pub startup_project: String,

    #[serde(default = "default_migration_context")]
    pub context: String,

    #[serde(default = "default_migration_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_configuration")]
    pub configuration: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    File,
    Directory,
}

/// A path that must exist before a build proceeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Requirement {
    pub name: String,
    pub path: String,
    pub kind: RequirementKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DockerConfig {
    #[serde(default = "default_docker_images")]
    pub images: Vec<DockerImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DockerImage {
    pub tag: String,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
}

/// Where `init` and `setup` write configuration files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScaffoldPaths {
    #[serde(default = "default_env_file")]
    pub env_file: String,

    #[serde(default = "default_appsettings_api")]
    pub appsettings_api: String,

    #[serde(default = "default_appsettings_integration")]
    pub appsettings_integration: String,
}

// =============================================================================
// Default value functions (the Taskly solution layout)
// =============================================================================

fn default_dotnet() -> DotnetConfig {
    DotnetConfig {
        projects: default_dotnet_projects(),
        configuration: default_configuration(),
    }
}

fn default_dotnet_projects() -> Vec<String> {
    [
        "src/Api/Api.csproj",
        "tests/IntegrationTests/IntegrationTests.csproj",
        "tests/UnitTests/UnitTests.csproj",
        "tools/AppHost/AppHost.csproj",
        "tools/MigrationService/MigrationService.csproj",
        "tools/ServiceDefaults/ServiceDefaults.csproj",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_configuration() -> String {
    "Debug".to_string()
}

fn default_tests() -> TestsConfig {
    TestsConfig {
        dir: default_tests_dir(),
        project_pattern: default_test_project_pattern(),
    }
}

fn default_tests_dir() -> String {
    "tests".to_string()
}

fn default_test_project_pattern() -> String {
    "*Tests.csproj".to_string()
}

fn default_web() -> WebConfig {
    WebConfig {
        dir: default_web_dir(),
        build_script: default_web_build_script(),
        test_script: default_web_test_script(),
    }
}

fn default_web_dir() -> String {
    "src/Web".to_string()
}

fn default_web_build_script() -> String {
    "build".to_string()
}

fn default_web_test_script() -> String {
    "test".to_string()
}

fn default_migration() -> MigrationSettings {
    MigrationSettings {
        project: default_migration_project(),
        startup_project: default_migration_project(),
        context: default_migration_context(),
        output_dir: default_migration_output_dir(),
        configuration: default_configuration(),
    }
}

fn default_migration_project() -> String {
    "src/Api/Api.csproj".to_string()
}

fn default_migration_context() -> String {
    "Api.Infrastructure.Data.ApplicationDbContext".to_string()
}

fn default_migration_output_dir() -> String {
    "src/Api/Infrastructure/Data/Migrations".to_string()
}

fn default_requirements() -> Vec<Requirement> {
    vec![
        Requirement {
            name: "Migrations".to_string(),
            path: default_migration_output_dir(),
            kind: RequirementKind::Directory,
            message: "Migrations folder missing! Run 'taskly-dev migration add <name>' or the dotnet ef tools.".to_string(),
        },
        Requirement {
            name: "appsettings.json".to_string(),
            path: default_appsettings_api(),
            kind: RequirementKind::File,
            message: "appsettings.json file is missing! Run 'taskly-dev setup'.".to_string(),
        },
        Requirement {
            name: "appsettings.integration.json".to_string(),
            path: default_appsettings_integration(),
            kind: RequirementKind::File,
            message: "appsettings.integration.json file is missing! Run 'taskly-dev setup'."
                .to_string(),
        },
    ]
}

fn default_docker() -> DockerConfig {
    DockerConfig {
        images: default_docker_images(),
    }
}

fn default_docker_images() -> Vec<DockerImage> {
    vec![DockerImage {
        tag: "taskly-web".to_string(),
        context: default_web_dir(),
        dockerfile: None,
    }]
}

fn default_scaffold() -> ScaffoldPaths {
    ScaffoldPaths {
        env_file: default_env_file(),
        appsettings_api: default_appsettings_api(),
        appsettings_integration: default_appsettings_integration(),
    }
}

fn default_env_file() -> String {
    "src/Web/.env".to_string()
}

fn default_appsettings_api() -> String {
    "src/Api/appsettings.json".to_string()
}

fn default_appsettings_integration() -> String {
    "tests/IntegrationTests/appsettings.integration.json".to_string()
}
