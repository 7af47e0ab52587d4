//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod process;
pub mod workflow;

pub use config::Config;
pub use diagnostic::Diagnostic;
pub use process::{ProcessBuilder, ProcessError, ProcessExecutor, SystemExecutor};
pub use workflow::{GitHubActions, LogGroup, Reporter};
