use super::{codes, ErrorCode, Hint};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorHelpSummary {
    pub code: String,
    pub summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorHelp {
    pub code: String,
    pub summary: String,
    pub details_schema: serde_json::Value,
    pub hints: Vec<Hint>,
}

pub fn list() -> Vec<ErrorHelpSummary> {
    codes::all_codes()
        .iter()
        .copied()
        .map(|code| {
            let help = explain(code);
            ErrorHelpSummary {
                code: help.code,
                summary: help.summary,
            }
        })
        .collect()
}

fn help(
    code: ErrorCode,
    summary: &str,
    details_schema: serde_json::Value,
    hint: &str,
) -> ErrorHelp {
    ErrorHelp {
        code: code.as_str().to_string(),
        summary: summary.to_string(),
        details_schema,
        hints: vec![Hint {
            message: hint.to_string(),
        }],
    }
}

pub fn explain(code: ErrorCode) -> ErrorHelp {
    use serde_json::json;

    match code {
        ErrorCode::ConfigInvalidJson => help(
            code,
            "taskly-dev.json is not valid JSON",
            json!({"path":"string","error":"string"}),
            "Fix the JSON syntax, or delete the file to fall back to defaults",
        ),
        ErrorCode::ConfigInvalidValue => help(
            code,
            "A configuration value is invalid",
            json!({"key":"string","value":"string?","problem":"string"}),
            "Run 'taskly-dev config show' to compare against the effective configuration",
        ),
        ErrorCode::ValidationMissingArgument => help(
            code,
            "Missing required CLI argument",
            json!({"args":"string[]"}),
            "Rerun the command with the required argument(s)",
        ),
        ErrorCode::ValidationInvalidArgument => help(
            code,
            "Invalid CLI argument",
            json!({"field":"string","problem":"string","id":"string?","tried":"string[]?"}),
            "Verify the argument value and try again",
        ),
        ErrorCode::ValidationUnknownErrorCode => help(
            code,
            "Unknown error code",
            json!({"code":"string"}),
            "Run 'taskly-dev error codes' to list available codes",
        ),
        ErrorCode::ProjectRootNotFound => help(
            code,
            "No project root found above the working directory",
            json!({"startDir":"string","markers":"string[]"}),
            "Pass --root <DIR> or set TASKLY_ROOT",
        ),
        ErrorCode::RequirementsMissing => help(
            code,
            "Required project files are missing",
            json!({"missing":[{"name":"string","path":"string","message":"string"}]}),
            "Run 'taskly-dev setup' to create configuration files and the initial migration",
        ),
        ErrorCode::ToolNotFound => help(
            code,
            "A required external tool is not installed",
            json!({"tool":"string"}),
            "Run 'taskly-dev doctor' to see which tools are missing",
        ),
        ErrorCode::ToolUnavailable => help(
            code,
            "An external tool is installed but not usable",
            json!({"tool":"string","problem":"string?"}),
            "Check that the tool works when invoked directly (e.g. 'dotnet ef --help', 'docker info')",
        ),
        ErrorCode::MigrationAlreadyExists => help(
            code,
            "A migration with the same name already exists",
            json!({"name":"string","directory":"string","matches":"string[]"}),
            "Choose a different migration name",
        ),
        ErrorCode::MigrationFailed => help(
            code,
            "The EF migration tool returned non-zero",
            json!({"command":"string","workingDir":"string","exitCode":"number","stdout":"string?","stderr":"string?"}),
            "Inspect stdout/stderr in error.details for the underlying failure",
        ),
        ErrorCode::BuildFailed => help(
            code,
            "A build step returned non-zero",
            json!({"command":"string","workingDir":"string","exitCode":"number","stdout":"string?","stderr":"string?"}),
            "Rerun the failing command shown in error.details directly to see full output",
        ),
        ErrorCode::TestFailed => help(
            code,
            "One or more test projects failed",
            json!({"report":"object"}),
            "Run 'taskly-dev test' to rerun tests and inspect per-project output",
        ),
        ErrorCode::TestNoProjects => help(
            code,
            "No test projects were discovered",
            json!({"searchDir":"string","pattern":"string"}),
            "Check tests.dir and tests.project_pattern in taskly-dev.json",
        ),
        ErrorCode::InternalIoError => help(
            code,
            "IO error",
            json!({"error":"string","context":"string?"}),
            "Check file permissions and paths",
        ),
        ErrorCode::InternalJsonError => help(
            code,
            "JSON error",
            json!({"error":"string","context":"string?"}),
            "Report this as a bug with the command you ran",
        ),
        ErrorCode::InternalUnexpected => help(
            code,
            "Unexpected internal error",
            json!({"error":"string"}),
            "Report this as a bug with the command you ran",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_covers_every_code() {
        let summaries = list();
        assert_eq!(summaries.len(), codes::all_codes().len());
        assert!(summaries
            .iter()
            .any(|s| s.code == "requirements.missing"));
    }

    #[test]
    fn explain_returns_matching_code() {
        let help = explain(ErrorCode::MigrationAlreadyExists);
        assert_eq!(help.code, "migration.already_exists");
        assert_eq!(help.hints.len(), 1);
    }
}
