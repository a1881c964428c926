use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod codes;
pub mod help;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationMissingArgument,
    ValidationInvalidArgument,
    ValidationUnknownErrorCode,

    ProjectRootNotFound,

    RequirementsMissing,
    ToolNotFound,
    ToolUnavailable,

    MigrationAlreadyExists,
    MigrationFailed,

    BuildFailed,
    TestFailed,
    TestNoProjects,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationUnknownErrorCode => "validation.unknown_error_code",

            ErrorCode::ProjectRootNotFound => "project.root_not_found",

            ErrorCode::RequirementsMissing => "requirements.missing",
            ErrorCode::ToolNotFound => "tool.not_found",
            ErrorCode::ToolUnavailable => "tool.unavailable",

            ErrorCode::MigrationAlreadyExists => "migration.already_exists",
            ErrorCode::MigrationFailed => "migration.failed",

            ErrorCode::BuildFailed => "build.failed",
            ErrorCode::TestFailed => "test.failed",
            ErrorCode::TestNoProjects => "test.no_projects",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        codes::all_codes()
            .iter()
            .copied()
            .find(|c| c.as_str() == code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingArgumentDetails {
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRootNotFoundDetails {
    pub start_dir: String,
    pub markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingRequirementDetails {
    pub name: String,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementsMissingDetails {
    pub missing: Vec<MissingRequirementDetails>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDetails {
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationAlreadyExistsDetails {
    pub name: String,
    pub directory: String,
    pub matches: Vec<String>,
}

/// Failure of an external tool invocation (build step, migration, test run).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    pub working_dir: String,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn validation_missing_argument(args: Vec<String>) -> Self {
        Self::new(
            ErrorCode::ValidationMissingArgument,
            "Missing required argument",
            to_details(MissingArgumentDetails { args }),
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let problem = problem.into();
        Self::new(
            ErrorCode::ValidationInvalidArgument,
            problem.clone(),
            to_details(InvalidArgumentDetails {
                field: field.into(),
                problem,
                id,
                tried,
            }),
        )
    }

    pub fn validation_unknown_error_code(code: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ValidationUnknownErrorCode,
            "Unknown error code",
            serde_json::json!({ "code": code.into() }),
        )
        .with_hint("Run 'taskly-dev error codes' to list available codes")
    }

    pub fn project_root_not_found(start_dir: impl Into<String>, markers: Vec<String>) -> Self {
        Self::new(
            ErrorCode::ProjectRootNotFound,
            "Could not locate the project root",
            to_details(ProjectRootNotFoundDetails {
                start_dir: start_dir.into(),
                markers,
            }),
        )
        .with_hint("Run from inside the repository, pass --root <DIR>, or set TASKLY_ROOT")
    }

    pub fn requirements_missing(missing: Vec<MissingRequirementDetails>) -> Self {
        let count = missing.len();
        Self::new(
            ErrorCode::RequirementsMissing,
            format!("{} requirement(s) missing", count),
            to_details(RequirementsMissingDetails { missing }),
        )
        .with_hint("Run 'taskly-dev setup' to scaffold configuration and the initial migration")
    }

    pub fn tool_not_found(tool: impl Into<String>, message: impl Into<String>) -> Self {
        let tool = tool.into();
        Self::new(
            ErrorCode::ToolNotFound,
            message,
            to_details(ToolDetails {
                tool: tool.clone(),
                problem: None,
            }),
        )
        .with_hint(format!("Install '{}' and make sure it is on PATH", tool))
    }

    pub fn tool_unavailable(tool: impl Into<String>, problem: impl Into<String>) -> Self {
        let tool = tool.into();
        let problem = problem.into();
        Self::new(
            ErrorCode::ToolUnavailable,
            problem.clone(),
            to_details(ToolDetails {
                tool,
                problem: Some(problem),
            }),
        )
    }

    pub fn migration_already_exists(
        name: impl Into<String>,
        directory: impl Into<String>,
        matches: Vec<String>,
    ) -> Self {
        let name = name.into();
        let directory = directory.into();
        Self::new(
            ErrorCode::MigrationAlreadyExists,
            format!(
                "A migration containing the name '{}' already exists in '{}'.",
                name, directory
            ),
            to_details(MigrationAlreadyExistsDetails {
                name,
                directory,
                matches,
            }),
        )
        .with_hint("Pick a different migration name or remove the existing migration first")
    }

    pub fn migration_failed(message: impl Into<String>, details: CommandFailedDetails) -> Self {
        Self::new(ErrorCode::MigrationFailed, message, to_details(details))
    }

    pub fn build_failed(message: impl Into<String>, details: CommandFailedDetails) -> Self {
        Self::new(ErrorCode::BuildFailed, message, to_details(details))
    }

    pub fn test_failed(message: impl Into<String>, details: Value) -> Self {
        Self::new(ErrorCode::TestFailed, message, details)
    }

    pub fn test_no_projects(search_dir: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::TestNoProjects,
            "No test projects found.",
            serde_json::json!({
                "searchDir": search_dir.into(),
                "pattern": pattern.into(),
            }),
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            to_details(ConfigInvalidJsonDetails {
                path: path.into(),
                error: err.to_string(),
            }),
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            to_details(ConfigInvalidValueDetails {
                key: key.into(),
                value,
                problem: problem.into(),
            }),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            "IO error",
            to_details(InternalIoErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            to_details(InternalJsonErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Attach an extra field to object details.
    pub fn with_detail(mut self, key: &str, value: impl Serialize) -> Self {
        if let Value::Object(map) = &mut self.details {
            map.insert(key.to_string(), to_details(value));
        }
        self
    }
}
