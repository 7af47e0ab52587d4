//! Subprocess execution utilities.
//!
//! Every toolchain invocation goes through a [`ProcessExecutor`], so the
//! pipeline stages never touch `std::process` directly and can be driven by
//! a mock in tests.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Failure to execute an external command.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{}` failed with exit code {}", .args.join(" "), display_code(.code))]
    Failed {
        /// Exit code, `None` when the process was terminated by a signal.
        code: Option<i32>,
        /// Program followed by its arguments.
        args: Vec<String>,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "<none>".to_string(),
    }
}

impl ProcessError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ProcessError::Spawn { command, source } => {
                Diagnostic::error("Command not found", format!("failed to spawn `{}`", command))
                    .with_context(source.to_string())
                    .with_suggestion("Check that the Rust toolchain is installed and on PATH")
            }
            ProcessError::Failed { code, args } => Diagnostic::error(
                "External command failed",
                format!("`{}` exited with code {}", args.join(" "), display_code(code)),
            ),
        }
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Program followed by all arguments.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![self.program.display().to_string()];
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        self.argv().join(" ")
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    fn spawn_error(&self, source: io::Error) -> ProcessError {
        ProcessError::Spawn {
            command: self.display_command(),
            source,
        }
    }

    fn check(&self, code: Option<i32>, success: bool) -> Result<(), ProcessError> {
        if success {
            Ok(())
        } else {
            Err(ProcessError::Failed {
                code,
                args: self.argv(),
            })
        }
    }
}

/// Runs external commands on behalf of the pipeline.
pub trait ProcessExecutor {
    /// Execute with inherited stdio, failing on a non-zero exit.
    fn run(&self, cmd: &ProcessBuilder) -> Result<(), ProcessError>;

    /// Execute with stdout captured as text, failing on a non-zero exit.
    ///
    /// Returns an empty string if the process wrote nothing.
    fn capture(&self, cmd: &ProcessBuilder) -> Result<String, ProcessError>;
}

/// Executes commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl ProcessExecutor for SystemExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> Result<(), ProcessError> {
        tracing::debug!("executing {}", cmd.display_command());

        let status = cmd
            .build_command()
            .status()
            .map_err(|e| cmd.spawn_error(e))?;

        cmd.check(status.code(), status.success())
    }

    fn capture(&self, cmd: &ProcessBuilder) -> Result<String, ProcessError> {
        tracing::debug!("executing {}", cmd.display_command());

        let output = cmd
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| cmd.spawn_error(e))?;

        cmd.check(output.status.code(), output.status.success())?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
