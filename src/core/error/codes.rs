use super::ErrorCode;

pub fn all_codes() -> &'static [ErrorCode] {
    &[
        ErrorCode::ConfigInvalidJson,
        ErrorCode::ConfigInvalidValue,
        ErrorCode::ValidationMissingArgument,
        ErrorCode::ValidationInvalidArgument,
        ErrorCode::ValidationUnknownErrorCode,
        ErrorCode::ProjectRootNotFound,
        ErrorCode::RequirementsMissing,
        ErrorCode::ToolNotFound,
        ErrorCode::ToolUnavailable,
        ErrorCode::MigrationAlreadyExists,
        ErrorCode::MigrationFailed,
        ErrorCode::BuildFailed,
        ErrorCode::TestFailed,
        ErrorCode::TestNoProjects,
        ErrorCode::InternalIoError,
        ErrorCode::InternalJsonError,
        ErrorCode::InternalUnexpected,
    ]
}
