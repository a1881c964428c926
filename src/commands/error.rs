use clap::{Args, Subcommand};
use serde::Serialize;

use taskly_dev::error::help::{self, ErrorHelp, ErrorHelpSummary};
use taskly_dev::{Error, ErrorCode};

use super::CmdResult;

#[derive(Args)]
pub struct ErrorArgs {
    #[command(subcommand)]
    command: ErrorCommand,
}

#[derive(Subcommand)]
enum ErrorCommand {
    /// List every error code
    Codes,
    /// Explain one error code (e.g. requirements.missing)
    Explain { code: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    codes: Option<Vec<ErrorHelpSummary>>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    help: Option<ErrorHelp>,
}

pub fn run(args: ErrorArgs) -> CmdResult<ErrorOutput> {
    match args.command {
        ErrorCommand::Codes => Ok((
            ErrorOutput {
                command: "error.codes",
                codes: Some(help::list()),
                help: None,
            },
            0,
        )),
        ErrorCommand::Explain { code } => {
            let parsed = ErrorCode::parse(code.trim())
                .ok_or_else(|| Error::validation_unknown_error_code(code.clone()))?;
            Ok((
                ErrorOutput {
                    command: "error.explain",
                    codes: None,
                    help: Some(help::explain(parsed)),
                },
                0,
            ))
        }
    }
}
