use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{build, config, doctor, error, init, migration, setup, test};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "taskly-dev")]
#[command(version = VERSION)]
#[command(about = "Developer workflow tooling for the Taskly solution")]
struct Cli {
    /// Project root (defaults to TASKLY_ROOT, then the nearest solution root)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Json(JsonCommands),
    /// List available commands (alias for --help)
    List,
}

/// Commands that answer with a JSON envelope on stdout.
#[derive(Subcommand)]
enum JsonCommands {
    /// Create missing local configuration files from templates
    Init(init::InitArgs),
    /// Initialize configuration and create the initial migration
    Setup(setup::SetupArgs),
    /// EF Core migrations
    #[command(visible_alias = "migrations")]
    Migration(migration::MigrationArgs),
    /// Check requirements and build the solution
    Build(build::BuildArgs),
    /// Run the test projects
    Test(test::TestArgs),
    /// Report installed tools and missing requirements
    Doctor(doctor::DoctorArgs),
    /// Manage taskly-dev.json
    Config(config::ConfigArgs),
    /// Error code reference
    Error(error::ErrorArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Json(command) => command,
        Commands::List => {
            let mut cmd = Cli::command();
            if cmd.print_help().is_err() {
                return std::process::ExitCode::FAILURE;
            }
            println!();
            return std::process::ExitCode::SUCCESS;
        }
    };

    let global = GlobalArgs { root: cli.root };
    let (json_result, exit_code) = commands::run_json(command, &global);

    if output::print_json_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
