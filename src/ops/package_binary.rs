//! The full packaging run: resolve, install, archive, publish.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::metadata::Package;
use crate::ops::archive::{package_binaries, ArchiveOptions, ArchiveResult};
use crate::ops::install::{install_package, InstallOptions};
use crate::ops::metadata::load_metadata;
use crate::ops::select::select_package;
use crate::ops::target::resolve_target;
use crate::toolchain::Toolchain;
use crate::util::config::Config;
use crate::util::process::ProcessExecutor;
use crate::util::workflow::Reporter;

/// Output holding the full path of the archive.
pub const OUTPUT_ARCHIVE_FILE: &str = "archive-file";

/// Output holding the file name of the archive.
pub const OUTPUT_ARCHIVE_NAME: &str = "archive-name";

/// Options for a packaging run.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Package to install; required when the workspace has several
    pub package: Option<String>,

    /// Target triple; the host triple when unset
    pub target: Option<String>,

    /// `cargo metadata` format version
    pub format_version: u32,

    pub install: InstallOptions,

    pub archive: ArchiveOptions,
}

impl PackageOptions {
    /// Options for the given inputs with default settings.
    ///
    /// Blank inputs count as unset, since workflow runners pass missing
    /// inputs as empty strings.
    pub fn new(package: Option<String>, target: Option<String>) -> Self {
        Self::with_config(package, target, &Config::default())
    }

    /// Options for the given inputs with settings taken from `config`.
    pub fn with_config(package: Option<String>, target: Option<String>, config: &Config) -> Self {
        PackageOptions {
            package: non_blank(package),
            target: non_blank(target),
            format_version: config.metadata.format_version,
            install: InstallOptions {
                verbose: config.install.verbose,
            },
            archive: ArchiveOptions {
                compression_level: config.archive.compression_level,
            },
        }
    }
}

fn non_blank(input: Option<String>) -> Option<String> {
    input
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct PackageResult {
    pub package: Package,
    pub target: String,
    pub binaries_dir: PathBuf,
    pub archive: ArchiveResult,
}

/// Install the selected package for the target and archive its binaries.
///
/// On success the archive path and name are published as the
/// `archive-file` and `archive-name` outputs. Any failure ends the run
/// before anything is published.
pub fn package_binary(
    opts: &PackageOptions,
    toolchain: &Toolchain,
    executor: &dyn ProcessExecutor,
    reporter: &mut dyn Reporter,
) -> Result<PackageResult> {
    tracing::info!(
        "inputs: package={}, target={}",
        opts.package.as_deref().unwrap_or("<unset>"),
        opts.target.as_deref().unwrap_or("<unset>")
    );

    let target = resolve_target(opts.target.as_deref(), toolchain, executor)?;

    let metadata = load_metadata(toolchain, executor, opts.format_version)?;

    let package = select_package(opts.package.as_deref(), &metadata)?.clone();
    tracing::info!(
        "package: {} {} ({})",
        package.name,
        package.version,
        package.manifest_path.display()
    );

    let binaries_dir = install_package(
        &package,
        &target,
        toolchain,
        executor,
        reporter,
        opts.install,
    )?;
    tracing::info!("binaries directory: {}", binaries_dir.display());

    let archive = package_binaries(&binaries_dir, &package, &target, reporter, opts.archive)?;
    tracing::info!("archive file: {}", archive.path.display());

    let archive_file = archive.path.to_string_lossy();
    reporter.set_outputs(&[
        (OUTPUT_ARCHIVE_FILE, archive_file.as_ref()),
        (OUTPUT_ARCHIVE_NAME, archive.name.as_str()),
    ])?;

    Ok(PackageResult {
        package,
        target,
        binaries_dir,
        archive,
    })
}
