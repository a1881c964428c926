//! Program lookup and output helpers shared by the process runners.

use serde::Serialize;
use std::path::PathBuf;

/// Locate a program on `PATH`.
///
/// On Windows this honours `PATHEXT`, so `npm` resolves to `npm.cmd`.
pub fn locate(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

/// Resolve a program to its absolute path, or return the bare name if not found.
///
/// Spawning the bare name then fails with the usual "not found" error.
pub fn resolve(program: &str) -> String {
    locate(program)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string())
}

/// Keep the last `lines` lines of a block of output.
pub fn tail(text: &str, lines: usize) -> String {
    let kept: Vec<&str> = text.lines().rev().take(lines).collect();
    kept.into_iter().rev().collect::<Vec<_>>().join("\n")
}

/// Captured output from command execution.
/// Reusable primitive for any command that executes external processes.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CapturedOutput {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl CapturedOutput {
    pub fn new(stdout: String, stderr: String) -> Self {
        Self { stdout, stderr }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }

    /// Prefer stderr, fall back to stdout.
    pub fn error_text(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_detects_missing_program() {
        assert!(locate("sh").is_some());
        assert!(locate("nonexistent_command_xyz").is_none());
    }

    #[test]
    fn resolve_falls_back_to_bare_name() {
        assert_eq!(resolve("nonexistent_command_xyz"), "nonexistent_command_xyz");
        assert!(resolve("sh").ends_with("sh"));
    }

    #[test]
    fn error_text_prefers_stderr() {
        let output = CapturedOutput::new("stdout content".to_string(), "stderr content".to_string());
        assert_eq!(output.error_text(), "stderr content");
    }

    #[test]
    fn error_text_falls_back_to_stdout() {
        let output = CapturedOutput::new("stdout content".to_string(), "  \n".to_string());
        assert_eq!(output.error_text(), "stdout content");
    }

    #[test]
    fn serializes_only_non_empty_streams() {
        let json = serde_json::to_value(CapturedOutput::new(String::new(), "boom".to_string())).unwrap();
        assert!(json.get("stdout").is_none());
        assert_eq!(json["stderr"], "boom");
    }

    #[test]
    fn tail_keeps_last_lines_in_order() {
        let text = "one\ntwo\nthree\nfour";
        assert_eq!(tail(text, 2), "three\nfour");
        assert_eq!(tail(text, 10), text);
        assert_eq!(tail("", 3), "");
    }
}
