//! Configuration file support.
//!
//! Settings are read from `package-binary.toml` in the working directory, or
//! from the file passed with `--config`. Every key is optional:
//!
//! ```toml
//! [toolchain]
//! cargo = "/opt/rust/bin/cargo"
//! rustc = "/opt/rust/bin/rustc"
//!
//! [metadata]
//! format-version = 1
//!
//! [install]
//! verbose = true
//!
//! [archive]
//! compression-level = 9
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "package-binary.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Toolchain program overrides
    pub toolchain: ToolchainConfig,

    /// `cargo metadata` settings
    pub metadata: MetadataConfig,

    /// `cargo install` settings
    pub install: InstallConfig,

    /// Archive settings
    pub archive: ArchiveConfig,
}

/// Paths to the toolchain programs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Path to `cargo`
    pub cargo: Option<PathBuf>,

    /// Path to `rustc`
    pub rustc: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MetadataConfig {
    /// Value passed to `cargo metadata --format-version`
    pub format_version: u32,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        MetadataConfig { format_version: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Pass `--verbose` to `cargo install`
    pub verbose: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        InstallConfig { verbose: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ArchiveConfig {
    /// Deflate level; the zip library default when unset
    pub compression_level: Option<i64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Resolve configuration for a run.
    ///
    /// An explicit path must exist; otherwise the default file in `cwd` is
    /// used when present.
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::load_or_default(&cwd.join(CONFIG_FILE_NAME)),
        }
    }
}
