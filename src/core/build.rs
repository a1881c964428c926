//! Sequential build orchestration for the solution.
//!
//! requirements -> restore -> .NET projects -> frontend -> tests -> images.
//! The first failing step stops the build.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::console;
use crate::defaults::WorkspaceConfig;
use crate::error::{Error, Result};
use crate::executor::{self, Invocation, Runner};
use crate::paths;
use crate::requirements::{self, RequirementReport};
use crate::test_runner::{self, TestOptions, TestReport};
use crate::tooling::{self, DOCKER, DOTNET, NPM};

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub test: bool,
    pub frontend: bool,
    pub docker: bool,
    pub skip_requirements: bool,
    /// Overrides `dotnet.configuration`.
    pub configuration: Option<String>,
    pub test_filter: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub name: String,
    pub command: String,
    pub working_dir: String,
    pub exit_code: i32,
    pub success: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub configuration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<RequirementReport>,
    pub steps: Vec<StepOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests: Option<TestReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    pub duration_ms: u64,
    pub success: bool,
}

struct Build<'a> {
    root: &'a Path,
    runner: &'a dyn Runner,
    steps: Vec<StepOutcome>,
}

impl<'a> Build<'a> {
    /// Run one step; a non-zero exit becomes `build.failed` with the steps completed so far.
    ///
    /// Steps stream their output on a terminal.
    fn step(&mut self, name: &str, invocation: Invocation) -> Result<()> {
        let invocation = invocation.passthrough();
        let run = self.runner.run(&invocation);

        self.steps.push(StepOutcome {
            name: name.to_string(),
            command: run.command.clone(),
            working_dir: paths::relative(self.root, &invocation.cwd),
            exit_code: run.exit_code,
            success: run.success,
            duration_ms: run.duration_ms,
        });

        if run.success {
            return Ok(());
        }

        let message = executor::format_failure(name, &run, &invocation.cwd);
        console::error(&message);

        let completed: Vec<String> = self
            .steps
            .iter()
            .filter(|s| s.success)
            .map(|s| s.name.clone())
            .collect();

        Err(Error::build_failed(message, run.failure_details(&invocation))
            .with_detail("step", name)
            .with_detail("completedSteps", completed))
    }
}

/// Requirement report including Docker when images are requested.
///
/// With `skip_requirements` only the Docker check remains.
pub fn preflight(
    root: &Path,
    config: &WorkspaceConfig,
    options: &BuildOptions,
    runner: &dyn Runner,
) -> RequirementReport {
    let mut report = if options.skip_requirements {
        requirements::check(root, &[])
    } else {
        requirements::check(root, &config.requirements)
    };

    if options.docker {
        if let Some(missing) = tooling::docker_requirement(runner, root) {
            report.push_missing(missing);
        } else {
            report.checked += 1;
        }
    }

    report
}

fn frontend_dir(root: &Path, config: &WorkspaceConfig) -> Result<PathBuf> {
    let web_dir = paths::join(root, &config.web.dir);
    if !web_dir.join("package.json").is_file() {
        return Err(Error::config_invalid_value(
            "web.dir",
            Some(config.web.dir.clone()),
            "package.json not found in the frontend directory",
        ));
    }
    Ok(web_dir)
}

/// Run the full build.
pub fn run(
    root: &Path,
    config: &WorkspaceConfig,
    options: &BuildOptions,
    runner: &dyn Runner,
) -> Result<BuildReport> {
    let started = Instant::now();
    let configuration = options
        .configuration
        .clone()
        .unwrap_or_else(|| config.dotnet.configuration.clone());

    let report = preflight(root, config, options, runner);
    let requirements = match requirements::ensure(report) {
        Ok(report) => report,
        Err(err) => {
            console::error("Build aborted due to unmet requirements.");
            return Err(err);
        }
    };

    tooling::require(runner, DOTNET, "dotnet SDK not installed or not in PATH.")?;

    let mut build = Build {
        root,
        runner,
        steps: Vec::new(),
    };

    console::info("Restoring .NET dependencies...");
    build.step("dotnet restore", Invocation::new(DOTNET, root).arg("restore"))?;

    console::info("Building .NET projects...");
    for project in &config.dotnet.projects {
        log_status!("build", "{}", project);
        build.step(
            &format!("dotnet build {}", project),
            Invocation::new(DOTNET, root)
                .args(["build", project.as_str(), "-c", configuration.as_str()])
                .args(["--no-restore", "--verbosity", "quiet", "/m"]),
        )?;
    }
    console::success("All .NET projects built successfully.");

    if options.frontend {
        tooling::require(runner, NPM, "npm not installed or not in PATH.")?;
        let web_dir = frontend_dir(root, config)?;

        console::info("Installing frontend dependencies...");
        let install = if web_dir.join("package-lock.json").is_file() {
            "ci"
        } else {
            "install"
        };
        build.step(
            &format!("npm {}", install),
            Invocation::new(NPM, &web_dir).arg(install),
        )?;

        console::info("Building frontend...");
        build.step(
            "npm run build",
            Invocation::new(NPM, &web_dir).args(["run", config.web.build_script.as_str()]),
        )?;
        console::success("Frontend built successfully.");
    }

    let tests = if options.test {
        let test_options = TestOptions {
            filter: options.test_filter.clone(),
            build: false,
            frontend: options.frontend,
        };
        let report = test_runner::run_all(root, config, &test_options, runner)?;
        if !report.success {
            console::error("Tests failed - stopping build.");
            return Err(Error::test_failed(
                format!("{} test project(s) failed", report.failed),
                serde_json::json!({ "report": report }),
            ));
        }
        Some(report)
    } else {
        None
    };

    let mut images = Vec::new();
    if options.docker {
        for image in &config.docker.images {
            console::info(format!("Building container image {}...", image.tag));
            let invocation = Invocation::new(DOCKER, root)
                .args(["build", "-t", image.tag.as_str()])
                .args(
                    image
                        .dockerfile
                        .iter()
                        .flat_map(|f| ["-f".to_string(), f.clone()]),
                )
                .arg(image.context.clone());
            build.step(&format!("docker build {}", image.tag), invocation)?;
            images.push(image.tag.clone());
        }
    }

    console::success("Build completed successfully.");

    Ok(BuildReport {
        configuration,
        requirements: Some(requirements).filter(|r| r.checked > 0),
        steps: build.steps,
        tests,
        images,
        duration_ms: started.elapsed().as_millis() as u64,
        success: true,
    })
}
