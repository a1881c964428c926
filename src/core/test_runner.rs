//! Discovery and execution of the solution's test projects.
//!
//! Every project runs even when an earlier one fails; the report aggregates.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::console;
use crate::defaults::{TestsConfig, WorkspaceConfig};
use crate::error::{Error, Result};
use crate::executor::{Invocation, Runner};
use crate::paths;
use crate::tooling::{self, DOTNET, NPM};
use crate::utils::command::CapturedOutput;

#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    /// Forwarded as `--filter <expr>`.
    pub filter: Option<String>,
    /// Let `dotnet test` build (drops `--no-build`).
    pub build: bool,
    /// Also run the frontend test script.
    pub frontend: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTestResult {
    pub name: String,
    pub project: String,
    pub success: bool,
    pub exit_code: i32,
    pub duration_ms: u64,
    /// Only kept for failures.
    #[serde(flatten)]
    pub output: CapturedOutput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub projects: Vec<ProjectTestResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend: Option<ProjectTestResult>,
    pub passed: usize,
    pub failed: usize,
    pub success: bool,
}

/// Test projects under the tests directory, sorted by path.
pub fn find_test_projects(root: &Path, tests: &TestsConfig) -> Result<Vec<PathBuf>> {
    let base = paths::join(root, &tests.dir);
    let pattern = format!(
        "{}/**/{}",
        glob::Pattern::escape(&base.to_string_lossy()),
        tests.project_pattern
    );

    let mut projects: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| {
            Error::config_invalid_value(
                "tests.project_pattern",
                Some(tests.project_pattern.clone()),
                e.to_string(),
            )
        })?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();

    projects.sort();
    Ok(projects)
}

fn project_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// `dotnet test <project> [--no-build] --verbosity quiet /m`, run from the project's directory.
pub fn run_project(
    root: &Path,
    project: &Path,
    options: &TestOptions,
    runner: &dyn Runner,
) -> ProjectTestResult {
    let name = project_name(project);
    console::info(format!("Running tests: {}", name));

    let cwd = project.parent().unwrap_or(root);
    let invocation = Invocation::new(DOTNET, cwd)
        .arg("test")
        .arg(project.to_string_lossy().to_string())
        .arg_if(!options.build, "--no-build")
        .args(["--verbosity", "quiet", "/m"])
        .args(
            options
                .filter
                .iter()
                .flat_map(|f| ["--filter".to_string(), f.clone()]),
        );

    let run = runner.run(&invocation);

    if run.success {
        console::success(format!("Tests passed: {}", name));
    } else {
        console::error(format!("Tests failed: {}", name));
        console::info(&run.output.stdout);
        console::info(&run.output.stderr);
    }

    ProjectTestResult {
        name,
        project: paths::relative(root, project),
        success: run.success,
        exit_code: run.exit_code,
        duration_ms: run.duration_ms,
        output: if run.success {
            CapturedOutput::default()
        } else {
            run.output
        },
    }
}

fn run_frontend(root: &Path, config: &WorkspaceConfig, runner: &dyn Runner) -> Result<ProjectTestResult> {
    tooling::require(runner, NPM, "npm not installed or not in PATH.")?;

    let web_dir = paths::join(root, &config.web.dir);
    console::info(format!("Running frontend tests in {}", config.web.dir));

    let run = runner.run(
        &Invocation::new(NPM, &web_dir)
            .args(["run", config.web.test_script.as_str()])
            .env("CI", "true"),
    );

    Ok(ProjectTestResult {
        name: "frontend".to_string(),
        project: config.web.dir.clone(),
        success: run.success,
        exit_code: run.exit_code,
        duration_ms: run.duration_ms,
        output: if run.success {
            CapturedOutput::default()
        } else {
            run.output
        },
    })
}

/// Run every discovered test project (and optionally the frontend tests).
pub fn run_all(
    root: &Path,
    config: &WorkspaceConfig,
    options: &TestOptions,
    runner: &dyn Runner,
) -> Result<TestReport> {
    tooling::require(runner, DOTNET, "dotnet SDK not installed or not in PATH.")?;
    console::info("Running all .NET tests...");

    let projects = find_test_projects(root, &config.tests)?;
    if projects.is_empty() {
        console::error("No test projects found.");
        return Err(Error::test_no_projects(
            config.tests.dir.clone(),
            config.tests.project_pattern.clone(),
        ));
    }

    let results: Vec<ProjectTestResult> = projects
        .iter()
        .map(|project| run_project(root, project, options, runner))
        .collect();

    let frontend = if options.frontend {
        Some(run_frontend(root, config, runner)?)
    } else {
        None
    };

    let passed = results.iter().filter(|r| r.success).count()
        + frontend.iter().filter(|r| r.success).count();
    let failed = results.iter().filter(|r| !r.success).count()
        + frontend.iter().filter(|r| !r.success).count();

    Ok(TestReport {
        projects: results,
        frontend,
        passed,
        failed,
        success: failed == 0,
    })
}
