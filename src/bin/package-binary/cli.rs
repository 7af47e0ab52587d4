//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Install a Cargo package's binaries for a target and bundle them into a zip
/// archive.
#[derive(Parser)]
#[command(name = "package-binary")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Package to install (required if the workspace has several packages)
    #[arg(long, env = "INPUT_PACKAGE")]
    pub package: Option<String>,

    /// Target triple to build for (defaults to the host triple)
    #[arg(long, env = "INPUT_TARGET")]
    pub target: Option<String>,

    /// Configuration file (defaults to ./package-binary.toml if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
