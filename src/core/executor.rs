//! External tool execution.
//!
//! Every external tool (dotnet, npm, docker) is invoked through [`Runner`] so the
//! orchestration in `build`, `migration` and `test_runner` can be exercised
//! without those tools installed.

use serde::Serialize;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use crate::error::CommandFailedDetails;
use crate::utils::command::{self, CapturedOutput};
use crate::utils::shell;

/// Lines of output kept in failure messages and error details.
pub const OUTPUT_TAIL_LINES: usize = 15;

/// A single program invocation: program, argv, working directory, extra env.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
    /// Stream output to the terminal instead of capturing it.
    pub passthrough: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: Vec::new(),
            passthrough: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn arg_if(self, condition: bool, arg: impl Into<String>) -> Self {
        if condition {
            self.arg(arg)
        } else {
            self
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Long-running steps whose progress the user should see as it happens.
    /// Only honoured when stderr is a terminal.
    pub fn passthrough(mut self) -> Self {
        self.passthrough = true;
        self
    }

    /// Copy-pastable command line.
    pub fn display(&self) -> String {
        shell::command_line(&self.program, &self.args)
    }
}

/// Result of running an [`Invocation`] with captured output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedRun {
    pub command: String,
    pub exit_code: i32,
    pub success: bool,
    pub duration_ms: u64,
    /// Output went straight to the terminal; `output` is empty.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub streamed: bool,
    #[serde(flatten)]
    pub output: CapturedOutput,
}

impl CapturedRun {
    pub fn failure_details(&self, invocation: &Invocation) -> CommandFailedDetails {
        CommandFailedDetails {
            command: self.command.clone(),
            working_dir: invocation.cwd.to_string_lossy().to_string(),
            exit_code: self.exit_code,
            stdout: command::tail(&self.output.stdout, OUTPUT_TAIL_LINES),
            stderr: command::tail(&self.output.stderr, OUTPUT_TAIL_LINES),
        }
    }
}

/// Seam between orchestration logic and the operating system.
pub trait Runner {
    /// Run to completion, capturing stdout and stderr.
    /// Never fails: spawn errors surface as exit code -1.
    fn run(&self, invocation: &Invocation) -> CapturedRun;

    /// Absolute path of a program on PATH, if installed.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    fn exists(&self, program: &str) -> bool {
        self.locate(program).is_some()
    }
}

/// Runs processes on the local machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> CapturedRun {
        let started = Instant::now();
        let mut cmd = Command::new(command::resolve(&invocation.program));
        cmd.args(&invocation.args).current_dir(&invocation.cwd);
        cmd.envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let streamed = invocation.passthrough && io::stderr().is_terminal();
        let (exit_code, success, output) = if streamed {
            passthrough(&mut cmd)
        } else {
            capture(&mut cmd)
        };

        CapturedRun {
            command: invocation.display(),
            exit_code,
            success,
            duration_ms: started.elapsed().as_millis() as u64,
            streamed,
            output,
        }
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        command::locate(program)
    }
}

fn spawn_error(e: io::Error) -> (i32, bool, CapturedOutput) {
    (
        -1,
        false,
        CapturedOutput::new(String::new(), format!("Command error: {}", e)),
    )
}

fn capture(cmd: &mut Command) -> (i32, bool, CapturedOutput) {
    match cmd.output() {
        Ok(out) => (
            out.status.code().unwrap_or(-1),
            out.status.success(),
            CapturedOutput::new(
                String::from_utf8_lossy(&out.stdout).to_string(),
                String::from_utf8_lossy(&out.stderr).to_string(),
            ),
        ),
        Err(e) => spawn_error(e),
    }
}

/// Child stdout is sent to our stderr; stdout is reserved for the JSON envelope.
fn passthrough(cmd: &mut Command) -> (i32, bool, CapturedOutput) {
    cmd.stdin(Stdio::null())
        .stdout(io::stderr())
        .stderr(Stdio::inherit());

    match cmd.status() {
        Ok(status) => (
            status.code().unwrap_or(-1),
            status.success(),
            CapturedOutput::default(),
        ),
        Err(e) => spawn_error(e),
    }
}

/// Format a failed run for humans: command, directory, exit code, output tail
/// and POSIX exit-code hints.
pub fn format_failure(label: &str, run: &CapturedRun, working_dir: &Path) -> String {
    let output_tail = command::tail(run.output.error_text(), OUTPUT_TAIL_LINES);

    let hint = match run.exit_code {
        127 => "\nHint: Command not found. Check that the tool is installed and in PATH.",
        126 => "\nHint: Permission denied. Check file permissions on the executable.",
        -1 => "\nHint: The process could not be started. Check that the tool is installed.",
        _ => "",
    };

    let mut msg = format!(
        "{} failed (exit code {}).\n  Command: {}\n  Working directory: {}",
        label,
        run.exit_code,
        run.command,
        working_dir.display()
    );

    if !output_tail.trim().is_empty() {
        msg.push_str(&format!(
            "\n\n--- Output (last {} lines) ---\n",
            OUTPUT_TAIL_LINES
        ));
        msg.push_str(&output_tail);
        msg.push_str("\n--- End of output ---");
    } else if run.streamed {
        msg.push_str("\n\nOutput was streamed above.");
    }

    msg.push_str(hint);
    msg
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted runner for orchestration tests.

    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    pub struct ScriptedRunner {
        pub installed: HashSet<String>,
        pub calls: RefCell<Vec<Invocation>>,
        failures: Vec<(String, i32, String)>,
        stdout: Vec<(String, String)>,
        hooks: Vec<(String, Box<dyn Fn(&Invocation)>)>,
    }

    impl ScriptedRunner {
        pub fn with_tools(tools: &[&str]) -> Self {
            Self {
                installed: tools.iter().map(|t| t.to_string()).collect(),
                calls: RefCell::new(Vec::new()),
                failures: Vec::new(),
                stdout: Vec::new(),
                hooks: Vec::new(),
            }
        }

        /// Any invocation whose command line contains `needle` exits with `code`.
        pub fn fail_on(mut self, needle: &str, code: i32, stderr: &str) -> Self {
            self.failures
                .push((needle.to_string(), code, stderr.to_string()));
            self
        }

        pub fn stdout_on(mut self, needle: &str, stdout: &str) -> Self {
            self.stdout.push((needle.to_string(), stdout.to_string()));
            self
        }

        /// Side effect for invocations matching `needle` (e.g. create generated files).
        pub fn on(mut self, needle: &str, hook: impl Fn(&Invocation) + 'static) -> Self {
            self.hooks.push((needle.to_string(), Box::new(hook)));
            self
        }

        pub fn commands(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|c| c.display()).collect()
        }
    }

    impl Runner for ScriptedRunner {
        fn run(&self, invocation: &Invocation) -> CapturedRun {
            self.calls.borrow_mut().push(invocation.clone());
            let line = invocation.display();

            for (needle, hook) in &self.hooks {
                if line.contains(needle.as_str()) {
                    hook(invocation);
                }
            }

            let stdout = self
                .stdout
                .iter()
                .find(|(needle, _)| line.contains(needle.as_str()))
                .map(|(_, out)| out.clone())
                .unwrap_or_default();

            match self
                .failures
                .iter()
                .find(|(needle, _, _)| line.contains(needle.as_str()))
            {
                Some((_, code, stderr)) => CapturedRun {
                    command: line,
                    exit_code: *code,
                    success: false,
                    duration_ms: 0,
                    streamed: invocation.passthrough,
                    output: CapturedOutput::new(stdout, stderr.clone()),
                },
                None => CapturedRun {
                    command: line,
                    exit_code: 0,
                    success: true,
                    duration_ms: 0,
                    streamed: invocation.passthrough,
                    output: CapturedOutput::new(stdout, String::new()),
                },
            }
        }

        fn locate(&self, program: &str) -> Option<PathBuf> {
            self.installed
                .contains(program)
                .then(|| PathBuf::from("/usr/bin").join(program))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_builder_collects_args() {
        let inv = Invocation::new("dotnet", "/repo")
            .arg("build")
            .args(["-c", "Debug"])
            .arg_if(false, "--no-restore")
            .arg_if(true, "/m");

        assert_eq!(inv.args, vec!["build", "-c", "Debug", "/m"]);
        assert_eq!(inv.display(), "dotnet build -c Debug /m");
    }

    #[test]
    fn system_runner_captures_success() {
        let dir = tempfile::tempdir().unwrap();
        let run = SystemRunner.run(&Invocation::new("echo", dir.path()).arg("hello"));

        assert!(run.success);
        assert_eq!(run.exit_code, 0);
        assert_eq!(run.output.stdout.trim(), "hello");
    }

    #[test]
    fn system_runner_captures_failure_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let run = SystemRunner.run(
            &Invocation::new("sh", dir.path())
                .arg("-c")
                .arg("echo oops >&2; exit 3"),
        );

        assert!(!run.success);
        assert_eq!(run.exit_code, 3);
        assert_eq!(run.output.stderr.trim(), "oops");
    }

    #[test]
    fn system_runner_reports_spawn_errors() {
        let dir = tempfile::tempdir().unwrap();
        let run = SystemRunner.run(&Invocation::new("nonexistent_command_xyz", dir.path()));

        assert!(!run.success);
        assert_eq!(run.exit_code, -1);
        assert!(run.output.stderr.starts_with("Command error:"));
    }

    #[test]
    fn system_runner_passes_env() {
        let dir = tempfile::tempdir().unwrap();
        let run = SystemRunner.run(
            &Invocation::new("sh", dir.path())
                .args(["-c", "printf %s \"$TASKLY_TEST_VAR\""])
                .env("TASKLY_TEST_VAR", "value"),
        );
        assert_eq!(run.output.stdout, "value");
    }

    #[test]
    fn format_failure_includes_hint_and_tail() {
        let run = CapturedRun {
            command: "npm run build".to_string(),
            exit_code: 127,
            success: false,
            duration_ms: 5,
            streamed: false,
            output: CapturedOutput::new(String::new(), "sh: npm: not found".to_string()),
        };

        let msg = format_failure("Frontend build", &run, Path::new("/repo/src/Web"));
        assert!(msg.starts_with("Frontend build failed (exit code 127)."));
        assert!(msg.contains("Command: npm run build"));
        assert!(msg.contains("sh: npm: not found"));
        assert!(msg.contains("Hint: Command not found"));
    }

    #[test]
    fn failure_details_keep_last_fifteen_lines() {
        let stderr: Vec<String> = (1..=20).map(|n| format!("line {}", n)).collect();
        let invocation = Invocation::new("dotnet", "/repo").arg("build");
        let run = CapturedRun {
            command: invocation.display(),
            exit_code: 1,
            success: false,
            duration_ms: 0,
            streamed: false,
            output: CapturedOutput::new(String::new(), stderr.join("\n")),
        };

        let details = run.failure_details(&invocation);
        assert_eq!(details.stderr.lines().count(), OUTPUT_TAIL_LINES);
        assert!(details.stderr.starts_with("line 6\n"));
        assert!(format_failure("Build", &run, Path::new("/repo")).contains("line 20"));
    }

    #[test]
    fn streamed_failure_points_at_terminal_output() {
        let run = CapturedRun {
            command: "dotnet restore".to_string(),
            exit_code: 1,
            success: false,
            duration_ms: 0,
            streamed: true,
            output: CapturedOutput::default(),
        };

        let msg = format_failure("dotnet restore", &run, Path::new("/repo"));
        assert!(msg.ends_with("Output was streamed above."));
    }

    #[test]
    fn passthrough_reports_exit_code_without_capturing() {
        let dir = tempfile::tempdir().unwrap();
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo progress; exit 4"]).current_dir(dir.path());

        let (exit_code, success, output) = passthrough(&mut cmd);
        assert_eq!(exit_code, 4);
        assert!(!success);
        assert!(output.is_empty());
    }

    #[test]
    fn passthrough_is_ignored_without_a_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = Invocation::new("echo", dir.path()).arg("hi").passthrough();
        let run = SystemRunner.run(&invocation);

        assert_eq!(run.streamed, io::stderr().is_terminal());
        if !run.streamed {
            assert_eq!(run.output.stdout.trim(), "hi");
        }
    }
}
