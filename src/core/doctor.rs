//! Environment report: tools, Docker daemon and the configured requirements.

use serde::Serialize;
use std::path::Path;

use crate::console;
use crate::defaults::WorkspaceConfig;
use crate::executor::Runner;
use crate::requirements::{self, RequirementReport};
use crate::tooling::{self, ToolStatus, DOCKER, TOOLS};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReport {
    pub root: String,
    pub tools: Vec<ToolStatus>,
    /// `None` when docker is not installed.
    pub docker_daemon: Option<bool>,
    pub requirements: RequirementReport,
    /// Every required tool is installed and every requirement is present.
    pub healthy: bool,
}

pub fn run(root: &Path, config: &WorkspaceConfig, runner: &dyn Runner) -> DoctorReport {
    let tools: Vec<ToolStatus> = TOOLS
        .iter()
        .map(|spec| tooling::inspect(runner, root, spec))
        .collect();

    for tool in &tools {
        match (&tool.version, tool.required) {
            (Some(version), _) => console::success(format!("{} {}", tool.name, version)),
            (None, true) => console::error(format!("{} is not installed", tool.name)),
            (None, false) => console::warning(format!("{} is not installed (optional)", tool.name)),
        }
    }

    let docker_daemon = runner
        .exists(DOCKER)
        .then(|| tooling::docker_running(runner, root));
    if docker_daemon == Some(false) {
        console::warning("Docker is installed but the daemon is not running.");
    }

    let requirements = requirements::check(root, &config.requirements);
    if !requirements.satisfied {
        console::error("Missing requirements:\n");
        console::block(&requirements::render_table(&requirements));
    }

    let healthy = requirements.satisfied && tools.iter().all(|t| t.installed || !t.required);

    DoctorReport {
        root: root.to_string_lossy().to_string(),
        tools,
        docker_daemon,
        requirements,
        healthy,
    }
}
