//! External command execution.
//!
//! Every collaborator (the two package managers, the hook installer, the
//! interpreter and test runner) is invoked as an opaque shell command line.
//! The [`CommandRunner`] trait is the seam between the workflow steps and
//! the operating system.

use std::path::Path;
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::error::{FerryError, Result};

/// How a child process's output is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout and stderr for inspection.
    Capture,
    /// Let the child write straight to the terminal.
    Passthrough,
}

/// Exit status and captured text of a finished command.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessOutput {
    /// Whether the command exited with status zero.
    pub success: bool,
    /// Exit code, or None when terminated by a signal.
    pub code: Option<i32>,
    /// Captured stdout (empty in pass-through mode).
    pub stdout: String,
    /// Captured stderr (empty in pass-through mode).
    pub stderr: String,
}

impl ProcessOutput {
    /// First non-empty line of stdout, falling back to stderr.
    ///
    /// Some tools print `--version` to stderr (older Pythons do).
    pub fn first_line(&self) -> Option<&str> {
        [&self.stdout, &self.stderr]
            .into_iter()
            .flat_map(|s| s.lines())
            .map(str::trim)
            .find(|l| !l.is_empty())
    }

    /// Short description of why the command failed, for warnings.
    pub fn failure_detail(&self) -> String {
        let status = match self.code {
            Some(c) => format!("exit status {}", c),
            None => "terminated by signal".to_string(),
        };
        match self.stderr.lines().map(str::trim).find(|l| !l.is_empty()) {
            Some(line) => format!("{}: {}", status, line),
            None => status,
        }
    }
}

/// Runs shell command lines on behalf of the workflow steps.
pub trait CommandRunner {
    /// Run `command` in `cwd`, blocking until it exits.
    ///
    /// Returns `Err` only when the command could not be started; a non-zero
    /// exit is reported through [`ProcessOutput::success`].
    fn run(&self, command: &str, cwd: &Path, mode: OutputMode) -> Result<ProcessOutput>;
}

/// Runs commands through the platform shell (`sh -c`, or `cmd /C` on Windows).
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    stdout_to_stderr: bool,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send pass-through child stdout to our stderr, keeping our own stdout
    /// free for machine-readable output.
    pub fn with_stdout_to_stderr(mut self, enabled: bool) -> Self {
        self.stdout_to_stderr = enabled;
        self
    }

    fn shell_command(command: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, cwd: &Path, mode: OutputMode) -> Result<ProcessOutput> {
        log::debug!("Running command; command={}, cwd={}, mode={:?}", command, cwd.display(), mode);

        let mut cmd = Self::shell_command(command);
        cmd.current_dir(cwd).stdin(Stdio::inherit());

        let spawn_err = |source| FerryError::CommandSpawn {
            command: command.to_string(),
            source,
        };

        match mode {
            OutputMode::Capture => {
                let output = cmd.output().map_err(spawn_err)?;
                Ok(ProcessOutput {
                    success: output.status.success(),
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            OutputMode::Passthrough => {
                if self.stdout_to_stderr {
                    cmd.stdout(Stdio::from(std::io::stderr()));
                } else {
                    cmd.stdout(Stdio::inherit());
                }
                cmd.stderr(Stdio::inherit());
                let status = cmd.status().map_err(spawn_err)?;
                Ok(ProcessOutput {
                    success: status.success(),
                    code: status.code(),
                    ..Default::default()
                })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted runner for unit tests.

    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;

    use super::*;

    /// Answers commands from a table; unknown commands fail to spawn.
    #[derive(Default)]
    pub struct ScriptedRunner {
        responses: HashMap<String, ProcessOutput>,
        pub calls: RefCell<Vec<(String, OutputMode)>>,
    }

    impl ScriptedRunner {
        pub fn ok(mut self, command: &str, stdout: &str) -> Self {
            self.responses.insert(
                command.to_string(),
                ProcessOutput {
                    success: true,
                    code: Some(0),
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                },
            );
            self
        }

        pub fn fail(mut self, command: &str, code: i32, stderr: &str) -> Self {
            self.responses.insert(
                command.to_string(),
                ProcessOutput {
                    success: false,
                    code: Some(code),
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                },
            );
            self
        }

        pub fn ran(&self, command: &str) -> bool {
            self.calls.borrow().iter().any(|(c, _)| c == command)
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, command: &str, _cwd: &Path, mode: OutputMode) -> Result<ProcessOutput> {
            self.calls.borrow_mut().push((command.to_string(), mode));
            self.responses
                .get(command)
                .cloned()
                .ok_or_else(|| FerryError::CommandSpawn {
                    command: command.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_prefers_stdout() {
        let out = ProcessOutput {
            success: true,
            code: Some(0),
            stdout: "\n  uv 0.5.11 (c4d0caaee 2024-12-19)\nextra\n".to_string(),
            stderr: "noise".to_string(),
        };
        assert_eq!(out.first_line(), Some("uv 0.5.11 (c4d0caaee 2024-12-19)"));
    }

    #[test]
    fn test_first_line_falls_back_to_stderr() {
        let out = ProcessOutput {
            success: true,
            code: Some(0),
            stdout: String::new(),
            stderr: "Python 2.7.18\n".to_string(),
        };
        assert_eq!(out.first_line(), Some("Python 2.7.18"));
    }

    #[test]
    fn test_failure_detail() {
        let out = ProcessOutput {
            success: false,
            code: Some(127),
            stdout: String::new(),
            stderr: "\nsh: 1: poetry: not found\n".to_string(),
        };
        assert_eq!(out.failure_detail(), "exit status 127: sh: 1: poetry: not found");
        assert_eq!(ProcessOutput::default().failure_detail(), "terminated by signal");
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = ShellRunner::new()
            .run("echo hello; echo oops >&2", dir.path(), OutputMode::Capture)
            .unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let out = ShellRunner::new()
            .run("exit 3", dir.path(), OutputMode::Passthrough)
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_uses_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let out = ShellRunner::new()
            .run("ls", dir.path(), OutputMode::Capture)
            .unwrap();
        assert!(out.stdout.contains("marker.txt"));
    }

    #[test]
    fn test_missing_cwd_is_spawn_error() {
        let result = ShellRunner::new().run(
            "echo hi",
            Path::new("/definitely/not/a/dir"),
            OutputMode::Capture,
        );
        assert!(matches!(result, Err(FerryError::CommandSpawn { .. })));
    }
}
