//! Detection of the external tools the workflow shells out to.

use serde::Serialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::executor::{Invocation, Runner};
use crate::requirements::MissingRequirement;

pub const DOTNET: &str = "dotnet";
pub const NPM: &str = "npm";
pub const NODE: &str = "node";
pub const DOCKER: &str = "docker";

/// A tool `doctor` reports on.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub program: &'static str,
    pub version_args: &'static [&'static str],
    pub required: bool,
    pub purpose: &'static str,
}

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "dotnet",
        program: DOTNET,
        version_args: &["--version"],
        required: true,
        purpose: "Restore, build and test the .NET projects",
    },
    ToolSpec {
        name: "dotnet-ef",
        program: DOTNET,
        version_args: &["ef", "--version"],
        required: true,
        purpose: "Create and apply EF Core migrations",
    },
    ToolSpec {
        name: "node",
        program: NODE,
        version_args: &["--version"],
        required: false,
        purpose: "Run the frontend toolchain",
    },
    ToolSpec {
        name: "npm",
        program: NPM,
        version_args: &["--version"],
        required: false,
        purpose: "Install and build the frontend package",
    },
    ToolSpec {
        name: "docker",
        program: DOCKER,
        version_args: &["--version"],
        required: false,
        purpose: "Build container images",
    },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStatus {
    pub name: String,
    pub required: bool,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub purpose: String,
}

/// Locate a tool, then ask for its version.
///
/// A located program whose version query fails is reported as not installed
/// (this is how a missing `dotnet ef` global tool shows up).
pub fn inspect(runner: &dyn Runner, root: &Path, spec: &ToolSpec) -> ToolStatus {
    let located = runner.locate(spec.program);

    let version = located.as_ref().and_then(|_| {
        let run = runner.run(&Invocation::new(spec.program, root).args(spec.version_args.iter().copied()));
        run.success
            .then(|| first_line(&run.output.stdout))
            .flatten()
    });

    ToolStatus {
        name: spec.name.to_string(),
        required: spec.required,
        installed: version.is_some(),
        version,
        path: located.map(|p| p.to_string_lossy().to_string()),
        purpose: spec.purpose.to_string(),
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| l.to_string())
}

/// Fail with `tool.not_found` unless the program is on PATH.
pub fn require(runner: &dyn Runner, program: &str, message: &str) -> Result<()> {
    if runner.exists(program) {
        Ok(())
    } else {
        Err(Error::tool_not_found(program, message))
    }
}

/// `dotnet ef --help` succeeds.
pub fn ef_available(runner: &dyn Runner, root: &Path) -> bool {
    runner
        .run(&Invocation::new(DOTNET, root).args(["ef", "--help"]))
        .success
}

/// `docker info` succeeds, i.e. the daemon is reachable.
pub fn docker_running(runner: &dyn Runner, root: &Path) -> bool {
    runner.exists(DOCKER) && runner.run(&Invocation::new(DOCKER, root).arg("info")).success
}

/// Docker as an aggregated requirement, `None` when it is running.
pub fn docker_requirement(runner: &dyn Runner, root: &Path) -> Option<MissingRequirement> {
    if docker_running(runner, root) {
        return None;
    }

    let message = if runner.exists(DOCKER) {
        "Docker is not running! Start Docker Desktop or the docker daemon."
    } else {
        "Docker is not installed or not in PATH."
    };

    Some(MissingRequirement {
        name: "Docker".to_string(),
        path: DOCKER.to_string(),
        message: message.to_string(),
    })
}
