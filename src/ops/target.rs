//! Default target triple resolution.

use anyhow::Result;

use crate::toolchain::{parse_host_triple, Toolchain};
use crate::util::process::ProcessExecutor;

/// The host triple reported by `rustc -vV`.
pub fn default_target_triple(toolchain: &Toolchain, executor: &dyn ProcessExecutor) -> Result<String> {
    let output = executor.capture(&toolchain.version_command())?;
    Ok(parse_host_triple(&output)?)
}

/// Use `requested` when given, otherwise the host triple.
pub fn resolve_target(
    requested: Option<&str>,
    toolchain: &Toolchain,
    executor: &dyn ProcessExecutor,
) -> Result<String> {
    match requested {
        Some(target) => Ok(target.to_string()),
        None => {
            let target = default_target_triple(toolchain, executor)?;
            tracing::info!("using default target: {}", target);
            Ok(target)
        }
    }
}
