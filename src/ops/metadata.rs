//! Loading workspace metadata from Cargo.

use anyhow::{Context, Result};

use crate::core::metadata::{parse_metadata, Metadata, MetadataError};
use crate::toolchain::Toolchain;
use crate::util::process::{ProcessError, ProcessExecutor};

/// Run `cargo metadata` and capture its JSON output.
pub fn fetch_metadata_json(
    toolchain: &Toolchain,
    executor: &dyn ProcessExecutor,
    format_version: u32,
) -> Result<String, ProcessError> {
    executor.capture(&toolchain.metadata_command(format_version))
}

/// Fetch and parse the workspace metadata.
///
/// The document must report the same format version that was requested.
pub fn load_metadata(
    toolchain: &Toolchain,
    executor: &dyn ProcessExecutor,
    format_version: u32,
) -> Result<Metadata> {
    let json = fetch_metadata_json(toolchain, executor, format_version)?;
    let metadata = parse_metadata(&json).context("failed to parse `cargo metadata` output")?;

    if metadata.version != format_version {
        return Err(MetadataError::UnsupportedFormatVersion {
            expected: format_version,
            found: metadata.version,
        }
        .into());
    }

    let duplicates = metadata.duplicate_names();
    if !duplicates.is_empty() {
        tracing::warn!(
            "workspace metadata lists duplicate package names ({}); the first match wins",
            duplicates.join(", ")
        );
    }

    tracing::debug!("metadata: {:?}", metadata);
    Ok(metadata)
}
