use std::path::PathBuf;

use taskly_dev::config::ConfigSource;
use taskly_dev::defaults::WorkspaceConfig;
use taskly_dev::paths;

pub type CmdResult<T> = taskly_dev::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub root: Option<PathBuf>,
}

/// Resolved project root plus its effective configuration.
pub(crate) struct Workspace {
    pub root: PathBuf,
    pub config: WorkspaceConfig,
    pub source: ConfigSource,
}

impl GlobalArgs {
    pub fn root(&self) -> taskly_dev::Result<PathBuf> {
        paths::project_root(self.root.as_deref())
    }

    pub fn workspace(&self) -> taskly_dev::Result<Workspace> {
        let root = self.root()?;
        let (config, source) = taskly_dev::config::load(&root)?;
        Ok(Workspace {
            root,
            config,
            source,
        })
    }
}

pub mod build;
pub mod config;
pub mod doctor;
pub mod error;
pub mod init;
pub mod migration;
pub mod setup;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::JsonCommands,
    global: &GlobalArgs,
) -> (taskly_dev::Result<serde_json::Value>, i32) {
    crate::tty::status("taskly-dev is working...");

    match command {
        // Commands without a workspace
        crate::JsonCommands::Error(args) => dispatch!(args, error),

        // Commands with global context
        crate::JsonCommands::Init(args) => dispatch!(args, global, init),
        crate::JsonCommands::Setup(args) => dispatch!(args, global, setup),
        crate::JsonCommands::Migration(args) => dispatch!(args, global, migration),
        crate::JsonCommands::Build(args) => dispatch!(args, global, build),
        crate::JsonCommands::Test(args) => dispatch!(args, global, test),
        crate::JsonCommands::Doctor(args) => dispatch!(args, global, doctor),
        crate::JsonCommands::Config(args) => dispatch!(args, global, config),
    }
}
