//! Filesystem utilities.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

/// A regular file found under a walked root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Location on disk
    pub path: PathBuf,
    /// `/`-separated path relative to the walked root
    pub relative: String,
}

/// Recursively list the regular files under `root`.
///
/// Entries are visited depth-first with siblings sorted by file name, so the
/// result is identical across platforms and runs. Symlinks that resolve to a
/// regular file are included; directories and other entries are not. A
/// missing root yields an empty list.
///
/// Fails if two files map to the same relative name, which happens when
/// non-UTF-8 file names decode to the same text.
pub fn walk_files(root: &Path) -> Result<Vec<WalkedFile>> {
    if !root.exists() {
        tracing::warn!("directory does not exist: {}", root.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to walk directory: {}", root.display()))?;
        let ty = entry.file_type();

        let is_file = ty.is_file() || (ty.is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let relative = relative_member_name(root, entry.path())?;
        if let Some(previous) = seen.insert(relative.clone(), entry.path().to_path_buf()) {
            bail!(
                "files {:?} and {:?} both map to archive member `{}`",
                previous,
                entry.path(),
                relative
            );
        }
        files.push(WalkedFile {
            path: entry.into_path(),
            relative,
        });
    }

    Ok(files)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// `/`-separated name of `path` relative to `base`.
///
/// Fails if the result would be absolute or step outside `base`.
pub fn relative_member_name(base: &Path, path: &Path) -> Result<String> {
    let relative = relative_path(base, path);

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => bail!(
                "`{}` is not inside `{}`",
                path.display(),
                base.display()
            ),
        }
    }

    if parts.is_empty() {
        bail!("`{}` has no path relative to itself", base.display());
    }

    Ok(parts.join("/"))
}

/// Create a fresh, uniquely named directory under the system temp dir.
///
/// The directory is not removed when the run ends.
pub fn create_temp_dir(prefix: &str) -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .with_context(|| format!("failed to create temporary directory `{}*`", prefix))?;
    Ok(dir.keep())
}
