//! The Rust toolchain as seen by the packaging pipeline.
//!
//! Knows where `cargo` and `rustc` live and how to spell the three
//! invocations the pipeline depends on: `cargo metadata`, `rustc -vV` and
//! `cargo install`.
//!
//! Program detection priority:
//! 1. Environment variables (`CARGO`, `RUSTC`)
//! 2. `[toolchain]` section of the config file
//! 3. Searching PATH
//! 4. The bare program name, left for the OS to resolve

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::util::config::ToolchainConfig;
use crate::util::diagnostic::Diagnostic;
use crate::util::process::{find_executable, ProcessBuilder};

/// Prefix of the line in `rustc -vV` output that names the host triple.
pub const HOST_PREFIX: &str = "host: ";

/// Toolchain output did not have the expected shape.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("`{command}` does not output the 'host' field")]
    MissingHostField { command: String },
}

impl ToolchainError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ToolchainError::MissingHostField { .. } => {
                Diagnostic::error("Toolchain configuration error", self.to_string())
                    .with_suggestion("Set the `target` input explicitly")
            }
        }
    }
}

/// Paths to the Cargo and rustc programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    cargo: PathBuf,
    rustc: PathBuf,
}

impl Toolchain {
    pub fn new(cargo: impl Into<PathBuf>, rustc: impl Into<PathBuf>) -> Self {
        Toolchain {
            cargo: cargo.into(),
            rustc: rustc.into(),
        }
    }

    /// Locate the toolchain using the process environment.
    pub fn detect(config: &ToolchainConfig) -> Self {
        Self::detect_with(config, |key| std::env::var_os(key))
    }

    /// Locate the toolchain with an explicit environment lookup.
    pub fn detect_with(config: &ToolchainConfig, env: impl Fn(&str) -> Option<OsString>) -> Self {
        let cargo = resolve_program("cargo", env("CARGO"), config.cargo.as_deref());
        let rustc = resolve_program("rustc", env("RUSTC"), config.rustc.as_deref());

        tracing::debug!("using cargo: {}", cargo.display());
        tracing::debug!("using rustc: {}", rustc.display());

        Toolchain { cargo, rustc }
    }

    pub fn cargo(&self) -> &Path {
        &self.cargo
    }

    pub fn rustc(&self) -> &Path {
        &self.rustc
    }

    /// `cargo metadata` restricted to workspace members, requiring an
    /// up-to-date lockfile.
    pub fn metadata_command(&self, format_version: u32) -> ProcessBuilder {
        ProcessBuilder::new(&self.cargo)
            .arg("metadata")
            .arg("--no-deps")
            .arg("--locked")
            .arg("--format-version")
            .arg(format_version.to_string())
    }

    /// `rustc -vV`, whose output includes the host triple.
    pub fn version_command(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.rustc).arg("-vV")
    }

    /// `cargo install` of a local package into a private root.
    pub fn install_command(&self, req: &InstallRequest<'_>) -> ProcessBuilder {
        let cmd = ProcessBuilder::new(&self.cargo)
            .arg("install")
            .arg("--path")
            .arg(req.source)
            .arg("--root")
            .arg(req.root)
            .args(["--force", "--no-track"])
            .args(["--locked", "--all-features"])
            .arg("--target")
            .arg(req.target);

        if req.verbose {
            cmd.arg("--verbose")
        } else {
            cmd
        }
    }
}

/// Arguments for [`Toolchain::install_command`].
#[derive(Debug, Clone, Copy)]
pub struct InstallRequest<'a> {
    /// Package source directory (the manifest's parent).
    pub source: &'a Path,
    /// Install root; binaries land in `<root>/bin`.
    pub root: &'a Path,
    /// Target triple to compile for.
    pub target: &'a str,
    pub verbose: bool,
}

fn resolve_program(name: &str, env: Option<OsString>, configured: Option<&Path>) -> PathBuf {
    if let Some(path) = env.filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(path) = configured {
        return path.to_path_buf();
    }
    find_executable(name).unwrap_or_else(|| PathBuf::from(name))
}

/// Extract the host triple from `rustc -vV` output.
pub fn parse_host_triple(output: &str) -> Result<String, ToolchainError> {
    output
        .lines()
        .find_map(|line| line.strip_prefix(HOST_PREFIX))
        .map(|triple| triple.trim().to_string())
        .filter(|triple| !triple.is_empty())
        .ok_or_else(|| ToolchainError::MissingHostField {
            command: "rustc -vV".to_string(),
        })
}
