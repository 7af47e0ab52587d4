//! Bundling installed binaries into a zip archive.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::metadata::Package;
use crate::util::fs::{create_temp_dir, walk_files, WalkedFile};
use crate::util::workflow::{LogGroup, Reporter};

/// Prefix of the temporary directory holding the archive.
pub const ARCHIVE_DIR_PREFIX: &str = "package-binary-archive-";

/// Options for the archive step.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveOptions {
    /// Deflate level; the zip library default when `None`
    pub compression_level: Option<i64>,
}

/// A written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveResult {
    /// Full path of the archive file
    pub path: PathBuf,
    /// File name of the archive
    pub name: String,
    /// Member names in the order they were written
    pub members: Vec<String>,
}

/// `{name}-{version}-{target}.zip`
pub fn archive_name(package: &Package, target: &str) -> String {
    format!("{}-{}-{}.zip", package.name, package.version, target)
}

/// Archive everything under `binaries_dir` into a fresh temporary directory.
pub fn package_binaries(
    binaries_dir: &Path,
    package: &Package,
    target: &str,
    reporter: &mut dyn Reporter,
    opts: ArchiveOptions,
) -> Result<ArchiveResult> {
    let name = archive_name(package, target);
    let path = create_temp_dir(ARCHIVE_DIR_PREFIX)?.join(&name);

    let members = write_archive(binaries_dir, &path, reporter, opts)?;

    Ok(ArchiveResult {
        path,
        name,
        members,
    })
}

/// Write every regular file under `root` into a new zip at `archive_path`.
///
/// Member names are relative to `root`. The archive file must not exist yet.
/// A missing or empty `root` produces a valid archive with no members.
pub fn write_archive(
    root: &Path,
    archive_path: &Path,
    reporter: &mut dyn Reporter,
    opts: ArchiveOptions,
) -> Result<Vec<String>> {
    let files = walk_files(root)?;

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(archive_path)
        .with_context(|| format!("failed to create archive: {}", archive_path.display()))?;

    let _group = LogGroup::new(reporter, "Built binary files");

    let mut zip = ZipWriter::new(file);
    let mut members = Vec::with_capacity(files.len());

    for walked in &files {
        add_file(&mut zip, walked, opts)?;
        tracing::info!("{}", walked.relative);
        members.push(walked.relative.clone());
    }

    zip.finish()
        .with_context(|| format!("failed to finish archive: {}", archive_path.display()))?;

    if members.is_empty() {
        tracing::warn!("no binaries found in {}", root.display());
    }

    Ok(members)
}

fn add_file(zip: &mut ZipWriter<File>, walked: &WalkedFile, opts: ArchiveOptions) -> Result<()> {
    let mut src = File::open(&walked.path)
        .with_context(|| format!("failed to open {}", walked.path.display()))?;
    let meta = src
        .metadata()
        .with_context(|| format!("failed to stat {}", walked.path.display()))?;

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(opts.compression_level)
        .large_file(meta.len() >= u64::from(u32::MAX))
        .unix_permissions(permissions(&meta));

    zip.start_file(walked.relative.as_str(), options)
        .with_context(|| format!("failed to add `{}` to archive", walked.relative))?;
    io::copy(&mut src, zip)
        .with_context(|| format!("failed to compress {}", walked.path.display()))?;

    Ok(())
}

#[cfg(unix)]
fn permissions(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permissions(_meta: &std::fs::Metadata) -> u32 {
    0o755
}
