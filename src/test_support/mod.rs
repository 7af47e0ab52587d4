//! Test utilities and mocks for unit tests.
//!
//! Provides a mock [`ProcessExecutor`] so the pipeline can be exercised
//! without a Rust toolchain, a [`Reporter`] that records workflow events, and
//! fixtures for `cargo metadata` documents.
//!
//! # Example
//!
//! ```rust,ignore
//! use package_binary::test_support::{MockExecutor, MockProcessOutput};
//!
//! #[test]
//! fn test_example() {
//!     let exec = MockExecutor::new();
//!     exec.expect("rustc -vV", MockProcessOutput::success("host: x86_64-unknown-linux-gnu\n"));
//!
//!     // Hand `&exec` to the code under test...
//! }
//! ```

pub mod fixtures;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::util::process::{ProcessBuilder, ProcessError, ProcessExecutor};
use crate::util::workflow::Reporter;

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Check if the process succeeded.
    pub fn success_status(&self) -> bool {
        self.status == 0
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match using a regex pattern.
    Regex(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
        }
    }
}

/// Side effect run when an expectation matches, given the full argv.
pub type Effect = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Expectation for a command execution.
#[derive(Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: MockProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
    /// Runs before the output is returned.
    pub effect: Option<Effect>,
}

impl fmt::Debug for CommandExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExpectation")
            .field("pattern", &self.pattern)
            .field("output", &self.output)
            .field("times", &self.times)
            .field("used", &self.used)
            .field("effect", &self.effect.is_some())
            .finish()
    }
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
            effect: None,
        }
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Run `effect` each time the expectation matches.
    pub fn with_effect(mut self, effect: impl Fn(&[String]) + Send + Sync + 'static) -> Self {
        self.effect = Some(Arc::new(effect));
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<CommandExpectation>,
    calls: Vec<String>,
}

/// Mock process executor for testing command execution.
///
/// Records every command it is asked to run and answers with the output of
/// the first matching expectation. Commands without a match fail as if the
/// program could not be spawned.
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<MockState>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::Exact(cmd.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ))
    }

    /// Add a prefix expectation that also runs a side effect.
    pub fn expect_prefix_with(
        &self,
        prefix: &str,
        output: MockProcessOutput,
        effect: impl Fn(&[String]) + Send + Sync + 'static,
    ) -> &Self {
        self.expect_pattern(
            CommandExpectation::new(CommandPattern::StartsWith(prefix.to_string()), output)
                .with_effect(effect),
        )
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&self, expectation: CommandExpectation) -> &Self {
        self.lock().expectations.push(expectation);
        self
    }

    /// Get all commands that were called.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<()> {
        for (i, exp) in self.lock().expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn execute(&self, cmd: &ProcessBuilder) -> Result<MockProcessOutput, ProcessError> {
        let full_cmd = cmd.display_command();
        let argv = cmd.argv();

        let (output, effect) = {
            let mut state = self.lock();
            state.calls.push(full_cmd.clone());

            let matched = state
                .expectations
                .iter_mut()
                .find(|exp| exp.pattern.matches(&full_cmd) && exp.available())
                .map(|exp| {
                    exp.used += 1;
                    (exp.output.clone(), exp.effect.clone())
                });

            match matched {
                Some(found) => found,
                None => {
                    return Err(ProcessError::Spawn {
                        command: full_cmd,
                        source: io::Error::new(io::ErrorKind::NotFound, "unexpected command"),
                    })
                }
            }
        };

        if let Some(effect) = effect {
            effect(&argv);
        }

        if output.success_status() {
            Ok(output)
        } else {
            Err(ProcessError::Failed {
                code: Some(output.status),
                args: argv,
            })
        }
    }
}

impl ProcessExecutor for MockExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> Result<(), ProcessError> {
        self.execute(cmd).map(|_| ())
    }

    fn capture(&self, cmd: &ProcessBuilder) -> Result<String, ProcessError> {
        self.execute(cmd).map(|out| out.stdout)
    }
}

/// A reporter event recorded by [`MemoryReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Output { name: String, value: String },
    StartGroup(String),
    EndGroup,
    Error { title: String, message: String },
}

/// Reporter that records events in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub events: Vec<Event>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Published outputs in order.
    pub fn outputs(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Output { name, value } => Some((name.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn set_outputs(&mut self, outputs: &[(&str, &str)]) -> Result<()> {
        for &(name, value) in outputs {
            self.events.push(Event::Output {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        Ok(())
    }

    fn start_group(&mut self, title: &str) {
        self.events.push(Event::StartGroup(title.to_string()));
    }

    fn end_group(&mut self) {
        self.events.push(Event::EndGroup);
    }

    fn error(&mut self, title: &str, message: &str) {
        self.events.push(Event::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

/// Value following `--root` in a `cargo install` argv.
pub fn install_root_from_args(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "--root")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_matches_in_order() {
        let exec = MockExecutor::new();
        exec.expect_pattern(
            CommandExpectation::new(
                CommandPattern::Regex(r"^rustc -vV$".to_string()),
                MockProcessOutput::success("first"),
            )
            .times(1),
        );
        exec.expect_prefix("rustc", MockProcessOutput::success("second"));

        let cmd = ProcessBuilder::new("rustc").arg("-vV");
        assert_eq!(exec.capture(&cmd).unwrap(), "first");
        assert_eq!(exec.capture(&cmd).unwrap(), "second");
        assert_eq!(exec.calls(), vec!["rustc -vV", "rustc -vV"]);
        exec.verify().unwrap();
    }

    #[test]
    fn test_mock_executor_unexpected_command() {
        let exec = MockExecutor::new();
        let err = exec.run(&ProcessBuilder::new("cargo")).unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
        assert_eq!(exec.calls(), vec!["cargo"]);
    }

    #[test]
    fn test_install_root_from_args() {
        let args: Vec<String> = ["cargo", "install", "--root", "/tmp/r", "--force"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(install_root_from_args(&args), Some(PathBuf::from("/tmp/r")));
        assert_eq!(install_root_from_args(&args[..3]), None);
    }
}
