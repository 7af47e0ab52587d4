//! Installing a package's binaries with `cargo install`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::metadata::Package;
use crate::toolchain::{InstallRequest, Toolchain};
use crate::util::fs::create_temp_dir;
use crate::util::process::ProcessExecutor;
use crate::util::workflow::{LogGroup, Reporter};

/// Prefix of the temporary install root.
pub const INSTALL_DIR_PREFIX: &str = "package-binary-install-";

/// Options for the install step.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Pass `--verbose` to `cargo install`
    pub verbose: bool,
}

/// Install `package` for `target` into a fresh root.
///
/// Returns `<root>/bin`. The directory is not checked for existence here; if
/// Cargo installed nothing, the archive simply ends up empty.
pub fn install_package(
    package: &Package,
    target: &str,
    toolchain: &Toolchain,
    executor: &dyn ProcessExecutor,
    reporter: &mut dyn Reporter,
    opts: InstallOptions,
) -> Result<PathBuf> {
    let source = package.manifest_dir().with_context(|| {
        format!(
            "manifest path `{}` of package `{}` has no parent directory",
            package.manifest_path.display(),
            package.name
        )
    })?;

    if package.binaries().next().is_none() {
        tracing::warn!("package `{}` has no binary targets", package.name);
    }

    let root = create_temp_dir(INSTALL_DIR_PREFIX)?;
    let cmd = toolchain.install_command(&InstallRequest {
        source,
        root: &root,
        target,
        verbose: opts.verbose,
    });

    {
        let _group = LogGroup::new(reporter, "Installing package binaries");
        executor.run(&cmd)?;
    }

    Ok(root.join("bin"))
}
